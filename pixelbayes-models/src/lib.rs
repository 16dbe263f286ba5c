pub mod corpus;
pub mod feature_table;
pub mod naive_bayes;

pub use corpus::Corpus;
pub use feature_table::FeatureTable;
pub use naive_bayes::{Evaluation, NaiveBayes};
