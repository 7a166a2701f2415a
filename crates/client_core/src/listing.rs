//! Backend quote listing with "last request wins" ordering.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::{debug, warn};

use crate::{api::QuoteApi, view::QuoteListView};

pub const DEFAULT_LIST_LIMIT: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRefresh {
    Applied(QuoteListView),
    /// A newer refresh started while this one was in flight; its result was
    /// dropped without rendering.
    Stale,
}

pub struct QuoteListController {
    api: Arc<dyn QuoteApi>,
    limit: u32,
    latest: Mutex<u64>,
}

impl QuoteListController {
    pub fn new(api: Arc<dyn QuoteApi>, limit: u32) -> Self {
        Self {
            api,
            limit: limit.max(1),
            latest: Mutex::new(0),
        }
    }

    /// Renders `Loading`, fetches, and renders the result only if no later
    /// refresh has started meanwhile. Ticket checks and renders happen under
    /// one lock so a stale result can never land after a fresh one.
    pub async fn refresh(
        &self,
        filter: Option<&str>,
        render: &(dyn Fn(&QuoteListView) + Send + Sync),
    ) -> ListRefresh {
        let filter = filter.map(str::trim).filter(|tag| !tag.is_empty());

        let ticket = {
            let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
            *latest += 1;
            render(&QuoteListView::Loading);
            *latest
        };

        let result = self.api.list_quotes(filter, self.limit).await;

        let latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        if *latest != ticket {
            debug!(ticket, latest = *latest, "listing: discarding stale result");
            return ListRefresh::Stale;
        }

        let view = match result {
            Ok(quotes) => QuoteListView::from_quotes(&quotes, Utc::now()),
            Err(err) => {
                warn!(filter = filter.unwrap_or(""), error = %err, "listing: load failed");
                QuoteListView::Failed
            }
        };
        render(&view);
        ListRefresh::Applied(view)
    }
}

#[cfg(test)]
#[path = "tests/listing_tests.rs"]
mod tests;
