//! Render models and the presentation collaborator the sync layer drives.

use chrono::{DateTime, Utc};
use shared::domain::{HistoryLog, ListedQuote, Quote, TagOption, Theme};

use crate::format::{author_line, quoted, time_ago};

pub const HISTORY_EMPTY_TITLE: &str = "No quotes generated yet";
pub const HISTORY_EMPTY_HINT: &str = "Start by generating your first quote above";
pub const LIST_EMPTY_MESSAGE: &str = "No quotes found. Generate your first quote!";
pub const LIST_LOADING_MESSAGE: &str = "Loading quotes...";
pub const LIST_FAILED_MESSAGE: &str = "Failed to load quotes. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteDisplay {
    pub text: String,
    pub tag: String,
    pub source_line: String,
    pub author_line: String,
    pub latency: Option<String>,
}

impl QuoteDisplay {
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            text: quoted(&quote.text),
            tag: quote.tag.clone(),
            source_line: format!("Generated by {}", quote.source_label()),
            author_line: author_line(&quote.author),
            latency: quote.latency_ms.map(|ms| format!("{ms}ms")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItemView {
    pub tag: String,
    pub time_ago: String,
    pub text: String,
    pub author_line: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    Empty { title: String, hint: String },
    Items(Vec<HistoryItemView>),
}

impl HistoryView {
    pub fn from_log(log: &HistoryLog, now: DateTime<Utc>) -> Self {
        if log.is_empty() {
            return HistoryView::Empty {
                title: HISTORY_EMPTY_TITLE.to_string(),
                hint: HISTORY_EMPTY_HINT.to_string(),
            };
        }

        HistoryView::Items(
            log.entries()
                .iter()
                .map(|entry| HistoryItemView {
                    tag: entry.quote.tag.clone(),
                    time_ago: time_ago(entry.timestamp, now),
                    text: quoted(&entry.quote.text),
                    author_line: author_line(&entry.quote.author),
                })
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteCardView {
    pub text: String,
    pub tag: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteListView {
    Loading,
    Empty,
    Failed,
    Items(Vec<QuoteCardView>),
}

impl QuoteListView {
    pub fn from_quotes(quotes: &[ListedQuote], now: DateTime<Utc>) -> Self {
        if quotes.is_empty() {
            return QuoteListView::Empty;
        }
        QuoteListView::Items(
            quotes
                .iter()
                .map(|quote| QuoteCardView {
                    text: quoted(&quote.quote),
                    tag: quote.tag.clone(),
                    date: time_ago(quote.created_at, now),
                })
                .collect(),
        )
    }

    /// Text shown instead of cards, if any.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            QuoteListView::Loading => Some(LIST_LOADING_MESSAGE),
            QuoteListView::Empty => Some(LIST_EMPTY_MESSAGE),
            QuoteListView::Failed => Some(LIST_FAILED_MESSAGE),
            QuoteListView::Items(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagSlot {
    /// Tag picker next to the free-text field.
    Selector,
    /// Tag filter above the quote list.
    Filter,
}

/// Input/output slots of the page. The sync layer reads current input
/// values and writes display content and enabled state; layout and styling
/// stay with the implementor.
pub trait PresentationSurface: Send + Sync {
    fn selected_tag(&self) -> String;
    fn free_text_tag(&self) -> String;
    fn requestor(&self) -> String;
    fn filter_tag(&self) -> String;

    fn set_selected_tag(&self, value: &str);
    fn set_free_text_tag(&self, value: &str);
    fn set_tag_options(&self, slot: TagSlot, options: &[TagOption]);

    fn set_submit_enabled(&self, enabled: bool);
    fn set_loading(&self, loading: bool);

    fn show_error(&self, message: &str);
    fn hide_error(&self);

    fn show_quote(&self, quote: &QuoteDisplay);
    fn hide_quote(&self);

    fn render_history(&self, history: &HistoryView);
    fn set_total_generated(&self, total: u64);
    fn render_quote_list(&self, list: &QuoteListView);

    fn apply_theme(&self, theme: Theme);

    fn copy_to_clipboard(&self, text: &str);
    fn share(&self, text: &str);
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
