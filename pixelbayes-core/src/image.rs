#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BayesError, Label, Pixel, PixelGrid, Result};

/// Parses raw ASCII rows into a square [`PixelGrid`].
///
/// Each character maps through [`Pixel::from_char`]; unknown characters are unshaded.
///
/// # Errors
///
/// - [`BayesError::InvalidShape`] if `rows` is empty, a row has a different width than
///   the first one, or the number of rows differs from the row width.
pub fn grid_from_rows<S: AsRef<str>>(rows: &[S]) -> Result<PixelGrid> {
    let first = rows.first().ok_or_else(|| BayesError::InvalidShape {
        expected: "at least one pixel row".into(),
        got: "no rows".into(),
    })?;

    // Dimension of the image is the width of its first row.
    let size = first.as_ref().chars().count();
    if size == 0 {
        return Err(BayesError::InvalidShape {
            expected: "a non-empty pixel row".into(),
            got: "an empty row".into(),
        });
    }

    if rows.len() != size {
        return Err(BayesError::InvalidShape {
            expected: format!("{size} rows of width {size}"),
            got: format!("{} rows", rows.len()),
        });
    }

    let mut cells = Vec::with_capacity(size * size);
    for (i, row) in rows.iter().enumerate() {
        let before = cells.len();
        cells.extend(row.as_ref().chars().map(Pixel::from_char));
        let width = cells.len() - before;
        if width != size {
            return Err(BayesError::InvalidShape {
                expected: format!("row {i} of width {size}"),
                got: format!("width {width}"),
            });
        }
    }

    Ok(PixelGrid::from_row_slice(size, size, &cells))
}

/// A labeled, square image of pixel shades.
///
/// Images are validated on construction and immutable afterwards.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    size: usize,
    label: Label,
    pixels: PixelGrid,
}

impl Image {
    /// Builds an image from explicit pixel data.
    ///
    /// # Errors
    ///
    /// - [`BayesError::InvalidShape`] if `size == 0`, the grid is not square, or its
    ///   dimensions differ from `size`.
    pub fn new(size: usize, label: Label, pixels: PixelGrid) -> Result<Self> {
        if size == 0 {
            return Err(BayesError::InvalidShape {
                expected: "a positive image size".into(),
                got: "0".into(),
            });
        }

        if pixels.nrows() != pixels.ncols() || pixels.nrows() != size {
            return Err(BayesError::InvalidShape {
                expected: format!("{size}x{size}"),
                got: format!("{}x{}", pixels.nrows(), pixels.ncols()),
            });
        }

        Ok(Self {
            size,
            label,
            pixels,
        })
    }

    /// Builds an image by parsing raw ASCII rows, see [`grid_from_rows`].
    pub fn from_rows<S: AsRef<str>>(rows: &[S], label: Label) -> Result<Self> {
        let pixels = grid_from_rows(rows)?;
        Ok(Self {
            size: pixels.nrows(),
            label,
            pixels,
        })
    }

    /// Shade at `(row, col)`.
    ///
    /// # Errors
    ///
    /// - [`BayesError::OutOfRange`] if either index is `>= size`.
    pub fn pixel(&self, row: usize, col: usize) -> Result<Pixel> {
        self.pixels
            .get((row, col))
            .copied()
            .ok_or(BayesError::OutOfRange {
                row,
                col,
                size: self.size,
            })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn pixels(&self) -> &PixelGrid {
        &self.pixels
    }
}
