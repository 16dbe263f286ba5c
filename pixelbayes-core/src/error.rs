use std::fmt;

use crate::Label;

#[derive(Debug)]
pub enum BayesError {
    /// IO-related failures (file not found, unreadable, etc.)
    Io(String),

    /// Image data that is empty, not square, or of the wrong size
    InvalidShape { expected: String, got: String },

    /// Pixel lookup outside of the `size × size` grid
    OutOfRange { row: usize, col: usize, size: usize },

    /// Label the feature table was never trained on
    UnknownLabel(Label),

    /// The grouped training corpus contains zero images.
    NoTrainingData,

    /// Corpus text that cannot be turned into labeled images
    MalformedCorpus { line: usize, message: String },

    /// Serialized model with a bad header or the wrong number of probabilities
    CorruptModel(String),

    /// Model used before training or loading
    NotFitted,

    /// Accuracy requested over a corpus with zero images.
    NoData,
}

impl fmt::Display for BayesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BayesError::Io(msg) => write!(f, "I/O error: {msg}"),
            BayesError::InvalidShape { expected, got } => {
                write!(f, "invalid image shape: expected {expected}, got {got}")
            }
            BayesError::OutOfRange { row, col, size } => write!(
                f,
                "pixel ({row}, {col}) is outside of a {size}x{size} image"
            ),
            BayesError::UnknownLabel(label) => write!(f, "unknown label {label:?}"),
            BayesError::MalformedCorpus { line, message } => {
                write!(f, "malformed corpus at line {line}: {message}")
            }
            BayesError::CorruptModel(msg) => write!(f, "corrupt model file: {msg}"),
            other => write!(f, "{:?}", other),
        }
    }
}

impl std::error::Error for BayesError {}

impl From<std::io::Error> for BayesError {
    fn from(err: std::io::Error) -> Self {
        BayesError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BayesError>;
