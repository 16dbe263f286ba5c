#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use pixelbayes_core::{
    laplace_from_counts, BayesError, Float, Image, Label, Pixel, PixelGrid, Result, Score,
    NUM_SHADES,
};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Trained **Naive Bayes probability model** over square pixel grids.
///
/// For every grid position `(row, col)`, shade `s` and label `L` the table stores the
/// smoothed conditional probability
///
/// ```text
/// P(pixel(row, col) = s | L) = (1 + #{images of L with that shade there}) / (3 + #{images of L})
/// ```
///
/// and for every label the smoothed prior
///
/// ```text
/// P(L) = (1 + #{images of L}) / (#labels + #{images})
/// ```
///
/// # Layout
///
/// Probabilities live in one flat vector, nested row, then column, then shade, then
/// label, which is also the order of the serialized text format:
///
/// ```text
/// offset = ((row · size + col) · 3 + shade) · #labels + label_index
/// ```
///
/// `labels` fixes the label axis order. It is ascending after [`train`](FeatureTable::train)
/// and file order after [`read_from`](FeatureTable::read_from).
///
/// # Text format
///
/// One token per line: image size, number of shades (`3`), number of labels, each label,
/// a blank line, each prior in label order, then every feature probability in layout order.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    /// Width and height of the images the table was trained on.
    image_size: usize,
    /// Label axis, in serialization order.
    labels: Vec<Label>,
    /// Prior per label, parallel to `labels`.
    priors: Vec<Float>,
    /// Flat `size × size × 3 × #labels` probability array.
    features: Vec<Float>,
}

impl FeatureTable {
    /// Creates an empty, untrained table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trains feature and prior probabilities from images grouped by label.
    ///
    /// A label whose group is empty is kept on the label axis; all of its feature
    /// probabilities are `1/3`.
    ///
    /// # Errors
    ///
    /// - [`BayesError::NoTrainingData`] if the map is empty or holds no image at all.
    /// - [`BayesError::InvalidShape`] if the images do not all share one size.
    ///
    /// On error the table is left unchanged.
    pub fn train(&mut self, groups: &BTreeMap<Label, Vec<Image>>) -> Result<()> {
        let total: usize = groups.values().map(Vec::len).sum();
        let image_size = groups
            .values()
            .flatten()
            .next()
            .map(Image::size)
            .ok_or(BayesError::NoTrainingData)?;

        if let Some(bad) = groups.values().flatten().find(|img| img.size() != image_size) {
            return Err(BayesError::InvalidShape {
                expected: format!("{image_size}x{image_size}"),
                got: format!("{0}x{0} (label {1:?})", bad.size(), bad.label()),
            });
        }

        let labels: Vec<Label> = groups.keys().copied().collect();
        let label_groups: Vec<&Vec<Image>> = groups.values().collect();

        // Shade histograms per label, indexed `(row · size + col) · 3 + shade`.
        #[cfg(feature = "parallel")]
        let counts: Vec<Vec<usize>> = label_groups
            .par_iter()
            .map(|images| shade_counts(images, image_size))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let counts: Vec<Vec<usize>> = label_groups
            .iter()
            .map(|images| shade_counts(images, image_size))
            .collect();

        let num_labels = labels.len();
        let mut features = vec![0.0; image_size * image_size * NUM_SHADES * num_labels];

        for row in 0..image_size {
            for col in 0..image_size {
                for shade in 0..NUM_SHADES {
                    let cell = (row * image_size + col) * NUM_SHADES + shade;
                    for (li, images) in label_groups.iter().enumerate() {
                        features[cell * num_labels + li] =
                            laplace_from_counts(counts[li][cell], images.len(), NUM_SHADES);
                    }
                }
            }
        }

        let priors = label_groups
            .iter()
            .map(|images| laplace_from_counts(images.len(), total, num_labels))
            .collect();

        tracing::info!(
            labels = num_labels,
            images = total,
            image_size,
            "trained feature table"
        );

        *self = Self {
            image_size,
            labels,
            priors,
            features,
        };

        Ok(())
    }

    /// Returns the table to its untrained state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_trained(&self) -> bool {
        !self.labels.is_empty() && !self.features.is_empty()
    }

    pub fn image_size(&self) -> usize {
        self.image_size
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    /// Priors in label order.
    pub fn priors(&self) -> &[Float] {
        &self.priors
    }

    /// Raw feature probabilities in layout order.
    pub fn features(&self) -> &[Float] {
        &self.features
    }

    /// Position of `label` on the label axis.
    pub fn label_index(&self, label: Label) -> Result<usize> {
        self.labels
            .iter()
            .position(|&l| l == label)
            .ok_or(BayesError::UnknownLabel(label))
    }

    fn offset(&self, row: usize, col: usize, shade: usize, label_index: usize) -> usize {
        ((row * self.image_size + col) * NUM_SHADES + shade) * self.labels.len() + label_index
    }

    /// Smoothed `P(pixel(row, col) = shade | label)`.
    ///
    /// # Errors
    ///
    /// - [`BayesError::NotFitted`] if the table is untrained.
    /// - [`BayesError::OutOfRange`] if `row` or `col` is `>= image_size`.
    /// - [`BayesError::UnknownLabel`] if `label` is not on the label axis.
    pub fn feature(&self, row: usize, col: usize, shade: Pixel, label: Label) -> Result<Float> {
        if !self.is_trained() {
            return Err(BayesError::NotFitted);
        }
        if row >= self.image_size || col >= self.image_size {
            return Err(BayesError::OutOfRange {
                row,
                col,
                size: self.image_size,
            });
        }
        let li = self.label_index(label)?;
        Ok(self.features[self.offset(row, col, shade.index(), li)])
    }

    /// Smoothed prior `P(label)`.
    pub fn prior(&self, label: Label) -> Result<Float> {
        if !self.is_trained() {
            return Err(BayesError::NotFitted);
        }
        let li = self.label_index(label)?;
        Ok(self.priors[li])
    }

    fn check_grid(&self, grid: &PixelGrid) -> Result<()> {
        if !self.is_trained() {
            return Err(BayesError::NotFitted);
        }
        if grid.nrows() != self.image_size || grid.ncols() != self.image_size {
            return Err(BayesError::InvalidShape {
                expected: format!("{0}x{0}", self.image_size),
                got: format!("{}x{}", grid.nrows(), grid.ncols()),
            });
        }
        Ok(())
    }

    /// Log-likelihood of `grid` under `label`:
    ///
    /// ```text
    /// ln P(L) + Σ_row Σ_col ln P(pixel(row, col) = observed | L)
    /// ```
    ///
    /// summed row-major.
    pub fn log_likelihood(&self, grid: &PixelGrid, label: Label) -> Result<Score> {
        self.check_grid(grid)?;
        let li = self.label_index(label)?;
        Ok(self.score_at(grid, li))
    }

    /// Log-likelihood of `grid` under every label, in label order.
    pub fn scores(&self, grid: &PixelGrid) -> Result<Vec<(Label, Score)>> {
        self.check_grid(grid)?;
        Ok(self
            .labels
            .iter()
            .enumerate()
            .map(|(li, &label)| (label, self.score_at(grid, li)))
            .collect())
    }

    fn score_at(&self, grid: &PixelGrid, label_index: usize) -> Score {
        let mut score = Score::from(self.priors[label_index]).ln();
        for row in 0..self.image_size {
            for col in 0..self.image_size {
                let shade = grid[(row, col)].index();
                let p = self.features[self.offset(row, col, shade, label_index)];
                score += Score::from(p).ln();
            }
        }
        score
    }

    /// Writes the table in the line-oriented text format.
    ///
    /// # Errors
    ///
    /// - [`BayesError::NotFitted`] if the table is untrained.
    /// - [`BayesError::Io`] if the writer fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        if !self.is_trained() {
            return Err(BayesError::NotFitted);
        }

        writeln!(writer, "{}", self.image_size)?;
        writeln!(writer, "{}", NUM_SHADES)?;
        writeln!(writer, "{}", self.labels.len())?;
        for label in &self.labels {
            writeln!(writer, "{label}")?;
        }
        writeln!(writer)?;

        // `{}` on f32 prints the shortest text that parses back to the same value.
        for prior in &self.priors {
            writeln!(writer, "{prior}")?;
        }
        for p in &self.features {
            writeln!(writer, "{p}")?;
        }

        Ok(())
    }

    /// Reads a table written by [`write_to`](FeatureTable::write_to).
    ///
    /// # Errors
    ///
    /// - [`BayesError::CorruptModel`] if the header is malformed, the number of shades is
    ///   not 3, a probability is unparsable or outside `(0, 1]`, or the number of feature
    ///   lines is zero or differs from `size² × 3 × #labels`.
    /// - [`BayesError::Io`] if the reader fails.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();

        let image_size = parse_count(&next_line(&mut lines, "image size")?, "image size")?;
        let num_shades = parse_count(&next_line(&mut lines, "shade count")?, "shade count")?;
        if num_shades != NUM_SHADES {
            return Err(BayesError::CorruptModel(format!(
                "expected {NUM_SHADES} shades, found {num_shades}"
            )));
        }
        let num_labels = parse_count(&next_line(&mut lines, "label count")?, "label count")?;

        let mut labels = Vec::with_capacity(num_labels.min(256));
        for _ in 0..num_labels {
            let line = next_line(&mut lines, "label")?;
            let mut chars = line.chars();
            let label = match (chars.next(), chars.next()) {
                (Some(label), None) => label,
                _ => {
                    return Err(BayesError::CorruptModel(format!(
                        "label line must hold one character, found {line:?}"
                    )))
                }
            };
            if labels.contains(&label) {
                return Err(BayesError::CorruptModel(format!(
                    "duplicate label {label:?}"
                )));
            }
            labels.push(label);
        }

        let separator = next_line(&mut lines, "blank separator line")?;
        if !separator.trim().is_empty() {
            return Err(BayesError::CorruptModel(format!(
                "expected a blank line after the labels, found {separator:?}"
            )));
        }

        let mut priors = Vec::with_capacity(labels.len());
        for _ in 0..num_labels {
            let line = next_line(&mut lines, "prior probability")?;
            priors.push(parse_probability(&line, "prior probability")?);
        }

        let expected = image_size
            .checked_mul(image_size)
            .and_then(|cells| cells.checked_mul(NUM_SHADES))
            .and_then(|n| n.checked_mul(num_labels))
            .ok_or_else(|| BayesError::CorruptModel("table dimensions overflow".into()))?;

        let mut features = Vec::new();
        for line in lines {
            let line = line?;
            let token = line.trim();
            if token.is_empty() {
                continue;
            }
            features.push(parse_probability(token, "feature probability")?);
        }

        if features.is_empty() || features.len() != expected {
            return Err(BayesError::CorruptModel(format!(
                "expected {expected} feature probabilities, found {}",
                features.len()
            )));
        }

        Ok(Self {
            image_size,
            labels,
            priors,
            features,
        })
    }

    /// Writes the table to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if !self.is_trained() {
            return Err(BayesError::NotFitted);
        }

        let path = path.as_ref();
        let file = File::create(path)
            .map_err(|err| BayesError::Io(format!("{}: {err}", path.display())))?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;

        tracing::info!(
            path = %path.display(),
            features = self.features.len(),
            "saved feature table"
        );
        Ok(())
    }

    /// Reads a table from `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|err| BayesError::Io(format!("{}: {err}", path.display())))?;
        let table = Self::read_from(BufReader::new(file))?;

        tracing::info!(
            path = %path.display(),
            labels = table.labels.len(),
            image_size = table.image_size,
            "loaded feature table"
        );
        Ok(table)
    }
}

/// Counts, for one label, how many images show each shade at each position.
fn shade_counts(images: &[Image], image_size: usize) -> Vec<usize> {
    let mut counts = vec![0usize; image_size * image_size * NUM_SHADES];
    for image in images {
        let pixels = image.pixels();
        for row in 0..image_size {
            for col in 0..image_size {
                let shade = pixels[(row, col)].index();
                counts[(row * image_size + col) * NUM_SHADES + shade] += 1;
            }
        }
    }
    counts
}

fn next_line<I>(lines: &mut I, what: &str) -> Result<String>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut line = lines
        .next()
        .ok_or_else(|| BayesError::CorruptModel(format!("missing {what}")))??;
    if line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

fn parse_count(line: &str, what: &str) -> Result<usize> {
    line.trim()
        .parse()
        .map_err(|_| BayesError::CorruptModel(format!("{what} is not a count: {line:?}")))
}

fn parse_probability(line: &str, what: &str) -> Result<Float> {
    let p: Float = line
        .trim()
        .parse()
        .map_err(|_| BayesError::CorruptModel(format!("{what} is not a number: {line:?}")))?;
    if !p.is_finite() || p <= 0.0 || p > 1.0 {
        return Err(BayesError::CorruptModel(format!(
            "{what} {p} is outside (0, 1]"
        )));
    }
    Ok(p)
}
