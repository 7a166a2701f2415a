pub mod api;
pub mod config;
pub mod controller;
pub mod format;
pub mod listing;
pub mod sync;
pub mod tags;
pub mod view;

pub use api::{HttpQuoteApi, QuoteApi};
pub use config::{load_settings, ClientSettings};
pub use controller::{resolve_tag, QuoteRequestController, Submission};
pub use listing::{ListRefresh, QuoteListController};
pub use sync::{PresentationSync, SyncOptions};
pub use tags::TagRegistry;
pub use view::{PresentationSurface, TagSlot};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
