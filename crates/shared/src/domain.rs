use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on tag length, counted in characters.
pub const MAX_TAG_LEN: usize = 50;

/// Number of entries the personal history keeps before evicting the oldest.
pub const HISTORY_CAPACITY: usize = 10;

/// A generated quote. Immutable once received from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "quote_text")]
    pub text: String,
    pub tag: String,
    pub author: String,
    /// Engine or model that produced the text, when the backend names one
    /// separately from the author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub quote: Quote,
    pub timestamp: DateTime<Utc>,
}

impl Quote {
    /// Origin shown as "Generated by ...": the source, else the author.
    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.author)
    }
}

impl HistoryEntry {
    pub fn capture(quote: Quote, timestamp: DateTime<Utc>) -> Self {
        Self { quote, timestamp }
    }
}

/// Newest-first personal history, bounded by [`HISTORY_CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl<'de> Deserialize<'de> for HistoryLog {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<HistoryEntry>::deserialize(deserializer).map(Self::from_entries)
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a log from entries already in newest-first order, dropping
    /// anything past capacity.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_CAPACITY);
        Self { entries }
    }

    pub fn push_front(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn head(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tags offered by the backend, in the order received, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    tags: Vec<String>,
}

impl TagSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Selector options: the value is sent as received, the label is capitalized.
    pub fn options(&self) -> Vec<TagOption> {
        self.tags
            .iter()
            .map(|tag| TagOption {
                value: tag.clone(),
                label: capitalize_first(tag),
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags: Vec<String> = Vec::new();
        for tag in iter {
            let tag = tag.into();
            if tag.trim().is_empty() || tags.contains(&tag) {
                continue;
            }
            tags.push(tag);
        }
        Self { tags }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOption {
    pub value: String,
    pub label: String,
}

pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Entry of the shared, backend-sourced quote listing. Distinct from
/// [`HistoryEntry`], which only ever lives on this client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedQuote {
    pub quote: String,
    pub tag: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(String),
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
