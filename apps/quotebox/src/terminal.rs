//! Stdout-backed [`PresentationSurface`].

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use client_core::{
    view::{HistoryView, QuoteDisplay, QuoteListView},
    PresentationSurface, TagSlot,
};
use shared::domain::{TagOption, Theme};

#[derive(Default)]
struct Inputs {
    selected: String,
    free_text: String,
    requestor: String,
    filter: String,
}

#[derive(Default)]
struct Rendered {
    tag_options: HashMap<TagSlot, Vec<TagOption>>,
    history: Option<HistoryView>,
    total_generated: u64,
    theme: Theme,
}

/// Holds the form inputs in memory and prints whatever the sync layer
/// renders. Output is suppressed while `echo` is off so start-up rendering
/// stays quiet.
#[derive(Default)]
pub struct TerminalSurface {
    inputs: Mutex<Inputs>,
    rendered: Mutex<Rendered>,
    echo: AtomicBool,
}

impl TerminalSurface {
    pub fn set_requestor(&self, value: &str) {
        lock(&self.inputs).requestor = value.to_string();
    }

    pub fn set_filter(&self, value: &str) {
        lock(&self.inputs).filter = value.to_string();
    }

    pub fn set_echo(&self, echo: bool) {
        self.echo.store(echo, Ordering::SeqCst);
    }

    pub fn print_tags(&self) {
        let rendered = lock(&self.rendered);
        let options = rendered
            .tag_options
            .get(&TagSlot::Selector)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if options.is_empty() {
            println!("No tags available");
        }
        for line in tag_lines(options) {
            println!("{line}");
        }
    }

    pub fn print_history(&self) {
        let rendered = lock(&self.rendered);
        if let Some(history) = &rendered.history {
            for line in history_lines(history) {
                println!("{line}");
            }
        }
        println!("Total generated: {}", rendered.total_generated);
    }

    pub fn print_theme(&self) {
        println!("Theme: {}", lock(&self.rendered).theme.as_str());
    }

    fn echo(&self) -> bool {
        self.echo.load(Ordering::SeqCst)
    }
}

impl PresentationSurface for TerminalSurface {
    fn selected_tag(&self) -> String {
        lock(&self.inputs).selected.clone()
    }

    fn free_text_tag(&self) -> String {
        lock(&self.inputs).free_text.clone()
    }

    fn requestor(&self) -> String {
        lock(&self.inputs).requestor.clone()
    }

    fn filter_tag(&self) -> String {
        lock(&self.inputs).filter.clone()
    }

    fn set_selected_tag(&self, value: &str) {
        lock(&self.inputs).selected = value.to_string();
    }

    fn set_free_text_tag(&self, value: &str) {
        lock(&self.inputs).free_text = value.to_string();
    }

    fn set_tag_options(&self, slot: TagSlot, options: &[TagOption]) {
        lock(&self.rendered)
            .tag_options
            .insert(slot, options.to_vec());
    }

    fn set_submit_enabled(&self, _enabled: bool) {}

    fn set_loading(&self, loading: bool) {
        if loading && self.echo() {
            println!("Generating...");
        }
    }

    fn show_error(&self, message: &str) {
        eprintln!("error: {message}");
    }

    fn hide_error(&self) {}

    fn show_quote(&self, quote: &QuoteDisplay) {
        if self.echo() {
            for line in quote_lines(quote) {
                println!("{line}");
            }
        }
    }

    fn hide_quote(&self) {}

    fn render_history(&self, history: &HistoryView) {
        lock(&self.rendered).history = Some(history.clone());
    }

    fn set_total_generated(&self, total: u64) {
        lock(&self.rendered).total_generated = total;
    }

    fn render_quote_list(&self, list: &QuoteListView) {
        if !self.echo() || *list == QuoteListView::Loading {
            return;
        }
        for line in list_lines(list) {
            println!("{line}");
        }
    }

    fn apply_theme(&self, theme: Theme) {
        lock(&self.rendered).theme = theme;
    }

    fn copy_to_clipboard(&self, text: &str) {
        println!("{text}");
    }

    fn share(&self, text: &str) {
        println!("{text}");
    }
}

pub fn quote_lines(quote: &QuoteDisplay) -> Vec<String> {
    let mut lines = vec![quote.text.clone(), quote.author_line.clone()];
    let mut meta = format!("[{}] {}", quote.tag, quote.source_line);
    if let Some(latency) = &quote.latency {
        meta.push_str(&format!(" ({latency})"));
    }
    lines.push(meta);
    lines
}

pub fn history_lines(history: &HistoryView) -> Vec<String> {
    match history {
        HistoryView::Empty { title, hint } => vec![title.clone(), hint.clone()],
        HistoryView::Items(items) => items
            .iter()
            .map(|item| {
                format!(
                    "[{}] {} {} ({})",
                    item.tag, item.text, item.author_line, item.time_ago
                )
            })
            .collect(),
    }
}

pub fn list_lines(list: &QuoteListView) -> Vec<String> {
    if let Some(placeholder) = list.placeholder() {
        return vec![placeholder.to_string()];
    }
    match list {
        QuoteListView::Items(cards) => cards
            .iter()
            .map(|card| format!("[{}] {} ({})", card.tag, card.text, card.date))
            .collect(),
        _ => Vec::new(),
    }
}

pub fn tag_lines(options: &[TagOption]) -> Vec<String> {
    options
        .iter()
        .map(|option| format!("{:<20} {}", option.value, option.label))
        .collect()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "tests/terminal_tests.rs"]
mod tests;
