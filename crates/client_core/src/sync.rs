//! Presentation Sync: the application-state object that keeps the page
//! consistent with the tag registry, the request controller, the quote
//! listing and the persisted history.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use chrono::Utc;
use shared::{
    domain::{Quote, Theme},
    error::QuoteError,
};
use storage::{HistoryStore, ThemeStore};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    api::QuoteApi,
    controller::QuoteRequestController,
    format::{copy_text, share_text},
    listing::{ListRefresh, QuoteListController, DEFAULT_LIST_LIMIT},
    tags::TagRegistry,
    view::{HistoryView, PresentationSurface, QuoteDisplay, QuoteListView, TagSlot},
};

pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Delay before re-reading the listing after a successful generation.
    pub refresh_delay: Duration,
    /// Whether a successful generation schedules that listing refresh at
    /// all. One-shot front ends that never show the listing turn it off.
    pub refresh_after_generate: bool,
    pub list_limit: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            refresh_delay: DEFAULT_REFRESH_DELAY,
            refresh_after_generate: true,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

pub struct PresentationSync {
    surface: Arc<dyn PresentationSurface>,
    tags: TagRegistry,
    controller: QuoteRequestController,
    listing: QuoteListController,
    history: Arc<HistoryStore>,
    theme: ThemeStore,
    refresh_delay: Option<Duration>,
    current_quote: Mutex<Option<Quote>>,
    pending_refreshes: Mutex<Vec<JoinHandle<()>>>,
}

/// Disables submit and shows the loading indicator until dropped.
struct LoadingGuard<'a> {
    surface: &'a dyn PresentationSurface,
}

impl<'a> LoadingGuard<'a> {
    fn engage(surface: &'a dyn PresentationSurface) -> Self {
        surface.set_submit_enabled(false);
        surface.set_loading(true);
        Self { surface }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.surface.set_loading(false);
        self.surface.set_submit_enabled(true);
    }
}

impl PresentationSync {
    pub fn new(
        surface: Arc<dyn PresentationSurface>,
        api: Arc<dyn QuoteApi>,
        history: Arc<HistoryStore>,
        theme: ThemeStore,
        options: SyncOptions,
    ) -> Arc<Self> {
        Arc::new(Self {
            surface,
            tags: TagRegistry::new(Arc::clone(&api)),
            controller: QuoteRequestController::new(Arc::clone(&api), Arc::clone(&history)),
            listing: QuoteListController::new(api, options.list_limit),
            history,
            theme,
            refresh_delay: options
                .refresh_after_generate
                .then_some(options.refresh_delay),
            current_quote: Mutex::new(None),
            pending_refreshes: Mutex::new(Vec::new()),
        })
    }

    pub fn controller(&self) -> &QuoteRequestController {
        &self.controller
    }

    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    /// Applies the persisted theme and history, then loads tags and the
    /// quote listing.
    pub async fn init(&self) {
        self.restore().await;

        let tags = self.tags.load_once().await;
        let options = tags.options();
        self.surface.set_tag_options(TagSlot::Selector, &options);
        self.surface.set_tag_options(TagSlot::Filter, &options);

        self.refresh_list().await;
        info!(tags = tags.len(), "sync: initialized");
    }

    /// The local half of [`PresentationSync::init`]: theme, history and
    /// counter from storage. Issues no network requests.
    pub async fn restore(&self) {
        self.surface.apply_theme(self.theme.current().await);
        self.render_history().await;
        self.surface.set_submit_enabled(true);
    }

    /// Cancels pending delayed refreshes.
    pub fn teardown(&self) {
        let handles = std::mem::take(&mut *lock(&self.pending_refreshes));
        let pending = handles.iter().filter(|h| !h.is_finished()).count();
        for handle in handles {
            handle.abort();
        }
        info!(pending, "sync: torn down");
    }

    pub fn on_tag_selected(&self) {
        if !self.surface.selected_tag().is_empty() {
            self.surface.set_free_text_tag("");
        }
    }

    pub fn on_free_text_changed(&self) {
        if !self.surface.free_text_tag().is_empty() {
            self.surface.set_selected_tag("");
        }
    }

    /// Submits the current inputs. A call made while a request is pending
    /// waits for that request and leaves the page to its initiator.
    pub async fn on_generate(self: &Arc<Self>) -> Result<Quote, QuoteError> {
        let selected = self.surface.selected_tag();
        let free_text = self.surface.free_text_tag();
        let requestor = self.surface.requestor();

        let submission = match self
            .controller
            .begin(&selected, &free_text, Some(&requestor))
            .await
        {
            Ok(submission) => submission,
            Err(err) => {
                self.surface.show_error(&err.user_message());
                return Err(err);
            }
        };

        if submission.joined() {
            debug!("sync: generate ignored while a request is pending");
            return submission.outcome().await;
        }

        let _loading = LoadingGuard::engage(self.surface.as_ref());
        self.surface.hide_error();
        self.surface.hide_quote();

        match submission.outcome().await {
            Ok(quote) => {
                self.surface.show_quote(&QuoteDisplay::from_quote(&quote));
                *lock(&self.current_quote) = Some(quote.clone());
                self.render_history().await;
                self.surface.set_selected_tag("");
                self.surface.set_free_text_tag("");
                self.schedule_list_refresh();
                Ok(quote)
            }
            Err(err) => {
                self.surface.show_error(&err.user_message());
                Err(err)
            }
        }
    }

    pub async fn on_filter_changed(&self) -> ListRefresh {
        self.refresh_list().await
    }

    pub async fn on_refresh(&self) -> ListRefresh {
        self.refresh_list().await
    }

    pub async fn on_refresh_tags(&self) {
        let options = self.tags.refresh().await.options();
        self.surface.set_tag_options(TagSlot::Selector, &options);
        self.surface.set_tag_options(TagSlot::Filter, &options);
    }

    /// Clears the history only when the user confirmed. Returns whether it
    /// was cleared.
    pub async fn on_clear_history(&self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        self.history.clear().await;
        self.render_history().await;
        info!("sync: history cleared");
        true
    }

    pub async fn on_toggle_theme(&self) -> Theme {
        let theme = self.theme.toggle().await;
        self.surface.apply_theme(theme);
        theme
    }

    /// Copies the displayed quote, falling back to the newest history entry.
    pub async fn on_copy_quote(&self) -> Option<String> {
        let text = copy_text(&self.displayed_quote().await?);
        self.surface.copy_to_clipboard(&text);
        Some(text)
    }

    pub async fn on_share_quote(&self) -> Option<String> {
        let text = share_text(&self.displayed_quote().await?);
        self.surface.share(&text);
        Some(text)
    }

    pub fn on_dismiss_error(&self) {
        self.surface.hide_error();
    }

    async fn displayed_quote(&self) -> Option<Quote> {
        let current = lock(&self.current_quote).clone();
        match current {
            Some(quote) => Some(quote),
            None => self
                .history
                .snapshot()
                .await
                .log
                .head()
                .map(|entry| entry.quote.clone()),
        }
    }

    async fn render_history(&self) {
        let snapshot = self.history.snapshot().await;
        self.surface
            .render_history(&HistoryView::from_log(&snapshot.log, Utc::now()));
        self.surface.set_total_generated(snapshot.total_generated);
    }

    async fn refresh_list(&self) -> ListRefresh {
        let filter = self.surface.filter_tag();
        let surface = Arc::clone(&self.surface);
        let render = move |view: &QuoteListView| surface.render_quote_list(view);
        self.listing.refresh(Some(&filter), &render).await
    }

    fn schedule_list_refresh(self: &Arc<Self>) {
        let Some(delay) = self.refresh_delay else {
            return;
        };
        let sync = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            sync.refresh_list().await;
        });

        let mut pending = lock(&self.pending_refreshes);
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
