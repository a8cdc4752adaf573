//! Example source: labeled (input, ground_truth) pairs with chunked access.
//!
//! Loading is a one-time read at construction. Rows missing a required
//! column are logged as warnings and retained with an empty field — the
//! valuator tolerates empty ground truth. An optional seeded shuffle makes
//! optimization runs comparable across repeats.

use crate::error::DataError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// One labeled example: a task input and the output the prompt should
/// produce for it. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub input: String,
    pub ground_truth: String,
}

impl Example {
    /// Create a new example.
    pub fn new(input: impl Into<String>, ground_truth: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ground_truth: ground_truth.into(),
        }
    }
}

/// An ordered collection of examples with a chunk cursor.
///
/// `next_chunk` advances the cursor by the requested size and returns an
/// empty slice once the cursor passes the end; `reset` rewinds to the start.
/// The cursor is the only mutable state.
#[derive(Debug, Clone)]
pub struct ExampleSet {
    examples: Vec<Example>,
    cursor: usize,
}

impl ExampleSet {
    /// Required columns in tabular sources.
    const REQUIRED_FIELDS: [&'static str; 2] = ["input", "ground_truth"];

    /// Create a set from pre-materialized records.
    pub fn from_records(examples: Vec<Example>) -> Self {
        Self {
            examples,
            cursor: 0,
        }
    }

    /// Load a set from a CSV file with `input` and `ground_truth` columns.
    ///
    /// Fails with [`DataError::NotFound`] if the path does not resolve.
    /// When `shuffle` is set, the examples are permuted deterministically
    /// from `seed`, so the same seed and source always give the same order.
    pub fn from_csv_path(
        path: impl AsRef<Path>,
        shuffle: bool,
        seed: u64,
    ) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NotFound(path.to_path_buf()));
        }

        let file = std::fs::File::open(path)?;
        let mut set = Self::from_csv_reader(file)?;
        if shuffle {
            set.shuffle(seed);
        }
        Ok(set)
    }

    /// Load a set from CSV content in memory (e.g. an uploaded file).
    ///
    /// Rows missing `input` or `ground_truth` are logged as warnings and
    /// kept with the field treated as empty.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let field_index = |name: &str| headers.iter().position(|h| h == name);
        let indices: Vec<Option<usize>> = Self::REQUIRED_FIELDS
            .iter()
            .map(|name| field_index(name))
            .collect();

        let mut examples = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            let mut values = Vec::with_capacity(Self::REQUIRED_FIELDS.len());
            for (name, index) in Self::REQUIRED_FIELDS.iter().zip(&indices) {
                match index.and_then(|i| record.get(i)) {
                    Some(value) => values.push(value.to_string()),
                    None => {
                        log::warn!("Record {} is missing required field `{}`", row, name);
                        values.push(String::new());
                    }
                }
            }
            let ground_truth = values.pop().unwrap_or_default();
            let input = values.pop().unwrap_or_default();
            examples.push(Example {
                input,
                ground_truth,
            });
        }

        Ok(Self::from_records(examples))
    }

    /// Permute the examples deterministically from the given seed.
    ///
    /// Also rewinds the chunk cursor.
    pub fn shuffle(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.examples.shuffle(&mut rng);
        self.cursor = 0;
    }

    /// Get the next chunk of at most `size` examples.
    ///
    /// The last chunk may be shorter; an empty slice signals exhaustion.
    pub fn next_chunk(&mut self, size: usize) -> &[Example] {
        let start = self.cursor.min(self.examples.len());
        let end = start.saturating_add(size).min(self.examples.len());
        self.cursor = end;
        &self.examples[start..end]
    }

    /// Rewind the chunk cursor to the beginning.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Iterate the whole set as chunks of at most `size` examples.
    ///
    /// Rewinds the cursor first, then yields owned chunks until the set is
    /// exhausted. `size` must be at least 1 or the iterator never ends.
    pub fn chunks(&mut self, size: usize) -> Chunks<'_> {
        self.reset();
        Chunks { set: self, size }
    }

    /// All examples in their current order.
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// Total number of examples.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the set holds no examples.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

/// Chunk iterator created by [`ExampleSet::chunks`].
#[derive(Debug)]
pub struct Chunks<'a> {
    set: &'a mut ExampleSet,
    size: usize,
}

impl Iterator for Chunks<'_> {
    type Item = Vec<Example>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.set.next_chunk(self.size);
        if chunk.is_empty() {
            None
        } else {
            Some(chunk.to_vec())
        }
    }
}
