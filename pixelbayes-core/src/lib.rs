pub mod error;
pub mod image;
pub mod smoothing;
pub mod types;

pub use types::{Float, Label, Pixel, PixelGrid, Score, NUM_SHADES};

pub use error::{BayesError, Result};

pub use image::{grid_from_rows, Image};
pub use smoothing::laplace_from_counts;
