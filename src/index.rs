//! Index store contract and an in-memory implementation with JSON snapshots.

use crate::fetcher::ParsedContent;
use crate::relevance::{Location, RelevanceMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// Characters of paragraph text kept as a page tagline.
pub const TAGLINE_CHARS: usize = 140;

/// Term postings plus indexed-document membership.
pub trait IndexStore {
    /// Whether `location` has already been indexed.
    fn is_indexed(&self, location: &Location) -> bool;

    /// Records the terms of `content` under `location`, marking it indexed.
    fn index_page(&mut self, location: &Location, content: &ParsedContent)
        -> Result<(), StoreError>;

    /// Per-location weights for `term`; empty when the term is unknown.
    fn lookup(&self, term: &str) -> RelevanceMap;
}

/// Errors surfaced by index stores.
#[derive(Debug)]
pub enum StoreError {
    /// Reading or writing a snapshot failed.
    Io(io::Error),
    /// A snapshot could not be encoded or decoded.
    Snapshot(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "index io error: {err}"),
            Self::Snapshot(err) => write!(f, "index snapshot error: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Snapshot(err) => Some(err),
        }
    }
}

/// Presentation data captured when a page is indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSummary {
    /// Document title, when the page had one.
    pub title: Option<String>,
    /// Leading paragraph text, at most [`TAGLINE_CHARS`] characters.
    pub tagline: String,
}

impl PageSummary {
    fn from_content(content: &ParsedContent) -> Self {
        let mut tagline = String::new();
        for text in content.texts().filter(|text| !text.is_empty()) {
            if !tagline.is_empty() {
                tagline.push(' ');
            }
            tagline.push_str(text);
            if tagline.chars().count() >= TAGLINE_CHARS {
                break;
            }
        }
        Self {
            title: content.title.clone(),
            tagline: tagline.chars().take(TAGLINE_CHARS).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PageEntry {
    summary: PageSummary,
    terms: Vec<String>,
}

/// Process-local index store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryIndex {
    postings: HashMap<String, HashMap<Location, u32>>,
    pages: HashMap<Location, PageEntry>,
}

impl MemoryIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Title and tagline stored for `location`.
    pub fn summary(&self, location: &Location) -> Option<&PageSummary> {
        self.pages.get(location).map(|entry| &entry.summary)
    }

    /// Writes a JSON snapshot to `path`.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let file = File::create(path).map_err(StoreError::Io)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).map_err(StoreError::Snapshot)?;
        writer.flush().map_err(StoreError::Io)
    }

    /// Reads a snapshot written by [`MemoryIndex::save`].
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path).map_err(StoreError::Io)?;
        serde_json::from_reader(BufReader::new(file)).map_err(StoreError::Snapshot)
    }

    fn remove_postings(&mut self, location: &Location, terms: &[String]) {
        for term in terms {
            if let Some(counts) = self.postings.get_mut(term) {
                counts.remove(location);
                if counts.is_empty() {
                    self.postings.remove(term);
                }
            }
        }
    }
}

impl IndexStore for MemoryIndex {
    fn is_indexed(&self, location: &Location) -> bool {
        self.pages.contains_key(location)
    }

    fn index_page(
        &mut self,
        location: &Location,
        content: &ParsedContent,
    ) -> Result<(), StoreError> {
        if let Some(previous) = self.pages.remove(location) {
            self.remove_postings(location, &previous.terms);
        }

        let mut counts: HashMap<String, u32> = HashMap::new();
        for text in content.texts() {
            for term in tokenize(text) {
                *counts.entry(term).or_insert(0) += 1;
            }
        }

        let terms: Vec<String> = counts.keys().cloned().collect();
        for (term, count) in counts {
            self.postings
                .entry(term)
                .or_default()
                .insert(location.clone(), count);
        }
        self.pages.insert(
            location.clone(),
            PageEntry {
                summary: PageSummary::from_content(content),
                terms,
            },
        );
        Ok(())
    }

    fn lookup(&self, term: &str) -> RelevanceMap {
        self.postings
            .get(term)
            .map(|counts| {
                counts
                    .iter()
                    .map(|(location, count)| (location.clone(), f64::from(*count)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Splits text into lowercase alphanumeric terms.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}
