use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{ListedQuote, Quote},
    error::TransportError,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotesQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotesResponse {
    #[serde(default)]
    pub quotes: Vec<ListedQuote>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateQuoteRequest {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requestor: Option<String>,
}

/// Response of `POST /quote`. Backends may send `quote` and/or `quote_text`
/// for the text and `source` and/or `author` for the origin, so every
/// spelling is its own field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratedQuote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_text: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl GeneratedQuote {
    /// `requested_tag` fills in for servers that do not echo the tag back.
    /// `quote_text` wins over `quote`. The author falls back to the source,
    /// then to "unknown"; the source stays unset when the reply has none.
    pub fn into_quote(self, requested_tag: &str) -> Result<Quote, TransportError> {
        let text = non_blank(self.quote_text)
            .or_else(|| non_blank(self.quote))
            .ok_or_else(|| TransportError::new("malformed quote response: missing quote text"))?;
        let source = non_blank(self.source);
        let author = non_blank(self.author)
            .or_else(|| source.clone())
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Quote {
            text,
            tag: non_blank(self.tag).unwrap_or_else(|| requested_tag.to_string()),
            author,
            source,
            latency_ms: self.latency_ms,
            created_at: self
                .created_at
                .or(self.timestamp)
                .unwrap_or_else(Utc::now),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
