use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use pixelbayes_core::{BayesError, Image, Label, Result};

/// A labeled image corpus, grouped by label.
///
/// Labels iterate in ascending order, which fixes the label order of any table
/// trained from the corpus.
///
/// # Text format
///
/// ```text
/// 0          <- label line (exactly one character)
/// ###        <- `size` pixel rows belonging to that label
/// # #
/// ###
/// 1
/// ...
/// ```
///
/// A label line with no rows after it still registers its label, with zero images.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    groups: BTreeMap<Label, Vec<Image>>,
    total: usize,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a corpus directly from images, grouping them by their label.
    pub fn from_images<I: IntoIterator<Item = Image>>(images: I) -> Self {
        let mut corpus = Self::new();
        for image in images {
            corpus.push(image);
        }
        corpus
    }

    /// Parses a corpus from a line-oriented reader.
    ///
    /// # Algorithm
    ///
    /// 1. Accumulate pixel rows.
    /// 2. On a line of exactly one character, commit the pending rows (if any) as an
    ///    image of the previous label, then make the line the current label.
    /// 3. At end of input, commit whatever rows remain.
    ///
    /// Empty lines are skipped and a trailing `\r` is ignored.
    ///
    /// # Errors
    ///
    /// - [`BayesError::MalformedCorpus`] if the input yields no image, pixel rows appear
    ///   before the first label, or a block of rows is not a square image.
    /// - [`BayesError::Io`] if the reader fails.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut corpus = Self::new();
        let mut current_label: Option<Label> = None;
        let mut rows: Vec<String> = Vec::new();
        // Line number of the first row in `rows`, for error reporting.
        let mut block_start = 0;

        for (i, line) in reader.lines().enumerate() {
            let mut line = line?;
            if line.ends_with('\r') {
                line.pop();
            }
            if line.is_empty() {
                continue;
            }

            let mut chars = line.chars();
            match (chars.next(), chars.next()) {
                (Some(label), None) => {
                    if !rows.is_empty() {
                        corpus.commit(current_label, &rows, block_start)?;
                        rows.clear();
                    }
                    corpus.groups.entry(label).or_default();
                    current_label = Some(label);
                }
                _ => {
                    if rows.is_empty() {
                        block_start = i + 1;
                    }
                    rows.push(line);
                }
            }
        }

        if !rows.is_empty() {
            corpus.commit(current_label, &rows, block_start)?;
        }

        if corpus.total == 0 {
            return Err(BayesError::MalformedCorpus {
                line: 0,
                message: "no images found".into(),
            });
        }

        tracing::debug!(
            labels = corpus.groups.len(),
            images = corpus.total,
            "parsed corpus"
        );

        Ok(corpus)
    }

    /// Reads and parses a corpus file, see [`Corpus::from_reader`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|err| {
            BayesError::Io(format!("{}: {err}", path.as_ref().display()))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    fn commit(&mut self, label: Option<Label>, rows: &[String], line: usize) -> Result<()> {
        let label = label.ok_or_else(|| BayesError::MalformedCorpus {
            line,
            message: "pixel rows before any label line".into(),
        })?;

        let image = Image::from_rows(rows, label).map_err(|err| BayesError::MalformedCorpus {
            line,
            message: err.to_string(),
        })?;

        self.push(image);
        Ok(())
    }

    pub fn push(&mut self, image: Image) {
        self.groups.entry(image.label()).or_default().push(image);
        self.total += 1;
    }

    /// Images grouped by label, in ascending label order.
    pub fn groups(&self) -> &BTreeMap<Label, Vec<Image>> {
        &self.groups
    }

    pub fn labels(&self) -> Vec<Label> {
        self.groups.keys().copied().collect()
    }

    /// Images carrying `label`, empty if the label is unknown.
    pub fn images(&self, label: Label) -> &[Image] {
        self.groups.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All images, label by label.
    pub fn iter(&self) -> impl Iterator<Item = &Image> {
        self.groups.values().flatten()
    }

    /// Total number of images across all labels.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Size of the first image, if any.
    pub fn image_size(&self) -> Option<usize> {
        self.iter().next().map(Image::size)
    }
}

impl FromStr for Corpus {
    type Err = BayesError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_reader(s.as_bytes())
    }
}

impl FromIterator<Image> for Corpus {
    fn from_iter<I: IntoIterator<Item = Image>>(iter: I) -> Self {
        Self::from_images(iter)
    }
}
