#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stored probability type (features and priors).
pub type Float = f32;

/// Log-likelihood accumulator.
pub type Score = f64;

/// Class of an image, a single character such as `'7'`.
pub type Label = char;

/// Square grid of pixel shades, indexed `(row, col)`.
pub type PixelGrid = nalgebra::DMatrix<Pixel>;

/// Number of shade categories a pixel can take.
pub const NUM_SHADES: usize = 3;

const SHADED_CHAR: char = '#';
const PARTIALLY_SHADED_CHAR: char = '+';
const UNSHADED_CHAR: char = ' ';

/// Shade of a single pixel.
///
/// The ordinal (`0`, `1`, `2`) is the index on the shade axis of the feature table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Pixel {
    #[default]
    Unshaded,
    PartiallyShaded,
    Shaded,
}

impl Pixel {
    /// Every shade, in ordinal order.
    pub const ALL: [Pixel; NUM_SHADES] = [Pixel::Unshaded, Pixel::PartiallyShaded, Pixel::Shaded];

    /// Parses a corpus character. Anything that is not `#` or `+` is unshaded.
    pub fn from_char(c: char) -> Self {
        match c {
            SHADED_CHAR => Pixel::Shaded,
            PARTIALLY_SHADED_CHAR => Pixel::PartiallyShaded,
            _ => Pixel::Unshaded,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Pixel::Unshaded => UNSHADED_CHAR,
            Pixel::PartiallyShaded => PARTIALLY_SHADED_CHAR,
            Pixel::Shaded => SHADED_CHAR,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl From<char> for Pixel {
    fn from(c: char) -> Self {
        Pixel::from_char(c)
    }
}
