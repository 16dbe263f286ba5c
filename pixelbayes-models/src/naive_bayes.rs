use std::path::Path;

use pixelbayes_core::{BayesError, Float, Image, Label, PixelGrid, Result, Score};

use crate::corpus::Corpus;
use crate::feature_table::FeatureTable;

/// Outcome of classifying a labeled corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub correct: usize,
    pub total: usize,
}

impl Evaluation {
    /// Fraction of correctly classified images, in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// - [`BayesError::NoData`] if no image was evaluated.
    pub fn accuracy(&self) -> Result<Float> {
        if self.total == 0 {
            return Err(BayesError::NoData);
        }
        Ok(self.correct as Float / self.total as Float)
    }
}

/// **Naive Bayes** classifier for square pixel-grid images.
///
/// Training reduces a labeled [`Corpus`] to a [`FeatureTable`]; the corpus itself is
/// not retained. Prediction picks the label with the highest log-likelihood:
///
/// ```text
/// ŷ = argmax_L  ln P(L) + Σ_row Σ_col ln P(pixel(row, col) | L)
/// ```
///
/// Ties go to the label that comes first in the table's label order.
///
/// # Errors
///
/// - [`BayesError::NoTrainingData`] if [`fit`](NaiveBayes::fit) is given an empty corpus.
/// - [`BayesError::NotFitted`] if predicting or saving before fit/load.
/// - [`BayesError::InvalidShape`] if a grid does not match the trained image size.
/// - [`BayesError::NoData`] if accuracy is requested over an empty corpus.
#[derive(Debug, Clone, Default)]
pub struct NaiveBayes {
    table: FeatureTable,
    /// Number of images the current table was trained on (0 after load).
    total_images: usize,
}

impl NaiveBayes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already trained or loaded table.
    pub fn from_table(table: FeatureTable) -> Self {
        Self {
            table,
            total_images: 0,
        }
    }

    /// Trains feature and prior probabilities from `corpus`.
    pub fn fit(&mut self, corpus: &Corpus) -> Result<()> {
        self.table.train(corpus.groups())?;
        self.total_images = corpus.len();
        Ok(())
    }

    /// Predicts the label of a completed pixel grid.
    pub fn predict(&self, grid: &PixelGrid) -> Result<Label> {
        let mut best: Option<(Label, Score)> = None;
        for (label, score) in self.table.scores(grid)? {
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((label, score)),
            }
        }
        best.map(|(label, _)| label).ok_or(BayesError::NotFitted)
    }

    pub fn predict_image(&self, image: &Image) -> Result<Label> {
        self.predict(image.pixels())
    }

    /// Log-likelihood of `grid` under every label, in label order.
    pub fn scores(&self, grid: &PixelGrid) -> Result<Vec<(Label, Score)>> {
        self.table.scores(grid)
    }

    pub fn log_likelihood(&self, grid: &PixelGrid, label: Label) -> Result<Score> {
        self.table.log_likelihood(grid, label)
    }

    /// Classifies every image of `corpus` and tallies correct predictions.
    pub fn evaluate(&self, corpus: &Corpus) -> Result<Evaluation> {
        if corpus.is_empty() {
            return Err(BayesError::NoData);
        }

        let mut correct = 0;
        for image in corpus.iter() {
            if self.predict_image(image)? == image.label() {
                correct += 1;
            }
        }

        let evaluation = Evaluation {
            correct,
            total: corpus.len(),
        };
        tracing::info!(correct, total = evaluation.total, "evaluated corpus");
        Ok(evaluation)
    }

    /// Fraction of `corpus` classified correctly.
    pub fn accuracy(&self, corpus: &Corpus) -> Result<Float> {
        self.evaluate(corpus)?.accuracy()
    }

    /// Loads a held-out corpus from `path` and returns the fraction classified correctly.
    pub fn accuracy_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Float> {
        let corpus = Corpus::load(path)?;
        self.accuracy(&corpus)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.table.save(path)
    }

    /// Replaces the current table with one read from `path`.
    ///
    /// On error the classifier keeps its previous table.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.table = FeatureTable::load(path)?;
        self.total_images = 0;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.total_images = 0;
    }

    pub fn is_fitted(&self) -> bool {
        self.table.is_trained()
    }

    pub fn table(&self) -> &FeatureTable {
        &self.table
    }

    pub fn total_images(&self) -> usize {
        self.total_images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelbayes_core::{grid_from_rows, Pixel};

    const TRAINING: &str = "\
0
###
#.#
###
0
###
#+#
###
1
.#.
.#.
.#.
1
+#.
.#.
.#.
";

    fn fitted() -> NaiveBayes {
        let corpus: Corpus = TRAINING.parse().unwrap();
        let mut model = NaiveBayes::new();
        model.fit(&corpus).unwrap();
        model
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pixelbayes-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_naive_bayes_new() {
        let model = NaiveBayes::new();
        assert!(!model.is_fitted());
        assert_eq!(model.total_images(), 0);
    }

    #[test]
    fn test_fit_empty_corpus() {
        let mut model = NaiveBayes::new();
        let result = model.fit(&Corpus::new());
        assert!(matches!(result, Err(BayesError::NoTrainingData)));
        assert!(!model.is_fitted());
    }

    #[test]
    fn test_fit_records_total() {
        let model = fitted();
        assert!(model.is_fitted());
        assert_eq!(model.total_images(), 4);
        assert_eq!(model.table().labels(), &['0', '1']);
    }

    #[test]
    fn test_predict_not_fitted() {
        let model = NaiveBayes::new();
        let grid = PixelGrid::from_element(3, 3, Pixel::Shaded);
        assert!(matches!(model.predict(&grid), Err(BayesError::NotFitted)));
    }

    #[test]
    fn test_predict_held_out_zero() {
        let model = fitted();
        let grid = grid_from_rows(&["###", "#.#", "##."]).unwrap();

        let zero = model.log_likelihood(&grid, '0').unwrap();
        let one = model.log_likelihood(&grid, '1').unwrap();
        assert!(zero > one);
        assert_eq!(model.predict(&grid).unwrap(), '0');
    }

    #[test]
    fn test_predict_held_out_one() {
        let model = fitted();
        let grid = grid_from_rows(&[".#.", ".#+", ".#."]).unwrap();
        assert_eq!(model.predict(&grid).unwrap(), '1');
    }

    #[test]
    fn test_predict_wrong_size() {
        let model = fitted();
        let grid = PixelGrid::from_element(4, 4, Pixel::Shaded);
        assert!(matches!(
            model.predict(&grid),
            Err(BayesError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_predict_tie_goes_to_first_label() {
        let corpus: Corpus = "b\n#.\n.#\na\n#.\n.#\n".parse().unwrap();
        let mut model = NaiveBayes::new();
        model.fit(&corpus).unwrap();

        let grid = grid_from_rows(&["#.", ".#"]).unwrap();
        let scores = model.scores(&grid).unwrap();
        assert_eq!(scores[0].1, scores[1].1);
        assert_eq!(model.predict(&grid).unwrap(), 'a');
    }

    #[test]
    fn test_scores_follow_label_order() {
        let model = fitted();
        let grid = grid_from_rows(&["...", "...", "..."]).unwrap();
        let labels: Vec<Label> = model.scores(&grid).unwrap().iter().map(|s| s.0).collect();
        assert_eq!(labels, vec!['0', '1']);
    }

    #[test]
    fn test_accuracy_on_training_corpus() {
        let model = fitted();
        let corpus: Corpus = TRAINING.parse().unwrap();
        let evaluation = model.evaluate(&corpus).unwrap();
        assert_eq!(evaluation, Evaluation { correct: 4, total: 4 });
        assert_eq!(model.accuracy(&corpus).unwrap(), 1.0);
    }

    #[test]
    fn test_accuracy_with_mislabeled_image() {
        let model = fitted();
        // The second image looks like a '1' but is labeled '0'.
        let corpus: Corpus = "0\n###\n#.#\n###\n0\n.#.\n.#.\n.#.\n".parse().unwrap();
        assert_eq!(model.accuracy(&corpus).unwrap(), 0.5);
    }

    #[test]
    fn test_accuracy_empty_corpus() {
        let model = fitted();
        assert!(matches!(
            model.accuracy(&Corpus::new()),
            Err(BayesError::NoData)
        ));
        let empty = Evaluation { correct: 0, total: 0 };
        assert!(matches!(empty.accuracy(), Err(BayesError::NoData)));
    }

    #[test]
    fn test_accuracy_from_path() {
        let model = fitted();
        let path = temp_path("accuracy-corpus.txt");
        std::fs::write(&path, TRAINING).unwrap();
        let accuracy = model.accuracy_from_path(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(accuracy, 1.0);
    }

    #[test]
    fn test_save_load_preserves_predictions() {
        let model = fitted();
        let path = temp_path("naive-bayes-model.txt");
        model.save(&path).unwrap();

        let mut loaded = NaiveBayes::new();
        loaded.load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.table(), model.table());
        let grid = grid_from_rows(&["+#.", ".#.", ".#."]).unwrap();
        assert_eq!(loaded.predict(&grid).unwrap(), model.predict(&grid).unwrap());
        assert_eq!(loaded.scores(&grid).unwrap(), model.scores(&grid).unwrap());
    }

    #[test]
    fn test_load_corrupt_keeps_previous_table() {
        let mut model = fitted();
        let path = temp_path("corrupt-model.txt");
        std::fs::write(&path, "3\n3\n2\n0\n1\n\n0.5\n0.5\n0.2\n").unwrap();
        let result = model.load(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(BayesError::CorruptModel(_))));
        assert!(model.is_fitted());
        assert_eq!(model.table().image_size(), 3);
    }

    #[test]
    fn test_save_not_fitted() {
        let model = NaiveBayes::new();
        let path = temp_path("unfitted-model.txt");
        let result = model.save(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(BayesError::NotFitted)));
    }

    #[test]
    fn test_clear() {
        let mut model = fitted();
        model.clear();
        assert!(!model.is_fitted());
        assert_eq!(model.total_images(), 0);
        let grid = PixelGrid::from_element(3, 3, Pixel::Shaded);
        assert!(matches!(model.predict(&grid), Err(BayesError::NotFitted)));
    }

    #[test]
    fn test_from_table() {
        let model = fitted();
        let wrapped = NaiveBayes::from_table(model.table().clone());
        let grid = grid_from_rows(&["###", "#.#", "###"]).unwrap();
        assert_eq!(wrapped.predict(&grid).unwrap(), '0');
    }
}
