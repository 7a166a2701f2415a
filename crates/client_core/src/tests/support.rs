//! Fakes shared by the unit tests: a scriptable [`QuoteApi`] and a
//! [`PresentationSurface`] that records everything written to it.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use shared::{
    domain::{ListedQuote, Quote, TagOption, Theme},
    error::TransportError,
    protocol::GenerateQuoteRequest,
};
use storage::{HistoryStore, KeyValueStore, MemoryStore, ThemeStore};
use tokio::sync::{oneshot, Semaphore};

use crate::{
    api::QuoteApi,
    sync::{PresentationSync, SyncOptions},
    view::{HistoryView, PresentationSurface, QuoteDisplay, QuoteListView, TagSlot},
};

pub(crate) fn quote(text: &str, tag: &str, author: &str) -> Quote {
    Quote {
        text: text.to_string(),
        tag: tag.to_string(),
        author: author.to_string(),
        source: None,
        latency_ms: None,
        created_at: Utc::now(),
    }
}

pub(crate) fn listed(text: &str, tag: &str) -> ListedQuote {
    ListedQuote {
        quote: text.to_string(),
        tag: tag.to_string(),
        created_at: Utc::now(),
    }
}

pub(crate) struct FakeQuoteApi {
    tags: Mutex<Result<Vec<String>, TransportError>>,
    generate_results: Mutex<VecDeque<Result<Quote, TransportError>>>,
    generate_gate: Semaphore,
    list_results: Mutex<HashMap<String, Vec<ListedQuote>>>,
    list_gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    list_fail: AtomicBool,
    pub tag_calls: AtomicUsize,
    pub generate_calls: AtomicUsize,
    pub generate_requests: Mutex<Vec<GenerateQuoteRequest>>,
    pub list_calls: Mutex<Vec<Option<String>>>,
}

impl FakeQuoteApi {
    pub(crate) fn new() -> Self {
        Self {
            tags: Mutex::new(Ok(Vec::new())),
            generate_results: Mutex::new(VecDeque::new()),
            generate_gate: Semaphore::new(Semaphore::MAX_PERMITS),
            list_results: Mutex::new(HashMap::new()),
            list_gates: Mutex::new(HashMap::new()),
            list_fail: AtomicBool::new(false),
            tag_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            generate_requests: Mutex::new(Vec::new()),
            list_calls: Mutex::new(Vec::new()),
        }
    }

    /// Generation requests block until [`FakeQuoteApi::release_generation`].
    pub(crate) fn gated() -> Self {
        Self {
            generate_gate: Semaphore::new(0),
            ..Self::new()
        }
    }

    pub(crate) fn with_tags(self, tags: &[&str]) -> Self {
        *self.tags.lock().unwrap() = Ok(tags.iter().map(|t| t.to_string()).collect());
        self
    }

    pub(crate) fn set_tags(&self, tags: &[&str]) {
        *self.tags.lock().unwrap() = Ok(tags.iter().map(|t| t.to_string()).collect());
    }

    pub(crate) fn with_failing_tags(self) -> Self {
        *self.tags.lock().unwrap() = Err(TransportError::new("Server unreachable"));
        self
    }

    pub(crate) fn push_generate(&self, result: Result<Quote, TransportError>) {
        self.generate_results.lock().unwrap().push_back(result);
    }

    pub(crate) fn release_generation(&self) {
        self.generate_gate.add_permits(1);
    }

    pub(crate) fn set_list(&self, filter: &str, quotes: Vec<ListedQuote>) {
        self.list_results
            .lock()
            .unwrap()
            .insert(filter.to_string(), quotes);
    }

    pub(crate) fn set_list_failing(&self, fail: bool) {
        self.list_fail.store(fail, Ordering::SeqCst);
    }

    /// The next listing for `filter` waits until the returned sender fires.
    pub(crate) fn gate_list(&self, filter: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.list_gates
            .lock()
            .unwrap()
            .insert(filter.to_string(), rx);
        tx
    }

    pub(crate) fn generate_count(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn tag_count(&self) -> usize {
        self.tag_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn list_count(&self) -> usize {
        self.list_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl QuoteApi for FakeQuoteApi {
    async fn fetch_tags(&self) -> Result<Vec<String>, TransportError> {
        self.tag_calls.fetch_add(1, Ordering::SeqCst);
        self.tags.lock().unwrap().clone()
    }

    async fn list_quotes(
        &self,
        tag: Option<&str>,
        _limit: u32,
    ) -> Result<Vec<ListedQuote>, TransportError> {
        let key = tag.unwrap_or_default().to_string();
        self.list_calls.lock().unwrap().push(tag.map(str::to_string));

        let gate = self.list_gates.lock().unwrap().remove(&key);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.list_fail.load(Ordering::SeqCst) {
            return Err(TransportError::http(500, "Failed to load quotes"));
        }
        Ok(self
            .list_results
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    async fn generate_quote(
        &self,
        request: &GenerateQuoteRequest,
    ) -> Result<Quote, TransportError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.generate_requests.lock().unwrap().push(request.clone());

        let permit = self
            .generate_gate
            .acquire()
            .await
            .expect("generate gate closed");
        permit.forget();

        self.generate_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(quote("Default quote", &request.tag, "fake-engine")))
    }
}

#[derive(Default)]
pub(crate) struct SurfaceState {
    pub selected: String,
    pub free_text: String,
    pub requestor: String,
    pub filter: String,
    pub tag_options: HashMap<TagSlot, Vec<TagOption>>,
    pub submit_enabled: bool,
    pub loading: bool,
    pub loading_changes: Vec<bool>,
    pub error: Option<String>,
    pub errors_shown: Vec<String>,
    pub quote: Option<QuoteDisplay>,
    pub quotes_shown: usize,
    pub history: Option<HistoryView>,
    pub history_renders: usize,
    pub total_generated: Option<u64>,
    pub list: Option<QuoteListView>,
    pub list_renders: Vec<QuoteListView>,
    pub theme: Option<Theme>,
    pub clipboard: Option<String>,
    pub shared: Option<String>,
}

#[derive(Default)]
pub(crate) struct RecordingSurface {
    pub state: Mutex<SurfaceState>,
}

impl RecordingSurface {
    pub(crate) fn with<R>(&self, f: impl FnOnce(&SurfaceState) -> R) -> R {
        f(&self.state.lock().unwrap())
    }

    pub(crate) fn set_requestor(&self, value: &str) {
        self.state.lock().unwrap().requestor = value.to_string();
    }

    pub(crate) fn set_filter(&self, value: &str) {
        self.state.lock().unwrap().filter = value.to_string();
    }
}

impl PresentationSurface for RecordingSurface {
    fn selected_tag(&self) -> String {
        self.state.lock().unwrap().selected.clone()
    }

    fn free_text_tag(&self) -> String {
        self.state.lock().unwrap().free_text.clone()
    }

    fn requestor(&self) -> String {
        self.state.lock().unwrap().requestor.clone()
    }

    fn filter_tag(&self) -> String {
        self.state.lock().unwrap().filter.clone()
    }

    fn set_selected_tag(&self, value: &str) {
        self.state.lock().unwrap().selected = value.to_string();
    }

    fn set_free_text_tag(&self, value: &str) {
        self.state.lock().unwrap().free_text = value.to_string();
    }

    fn set_tag_options(&self, slot: TagSlot, options: &[TagOption]) {
        self.state
            .lock()
            .unwrap()
            .tag_options
            .insert(slot, options.to_vec());
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.state.lock().unwrap().submit_enabled = enabled;
    }

    fn set_loading(&self, loading: bool) {
        let mut state = self.state.lock().unwrap();
        state.loading = loading;
        state.loading_changes.push(loading);
    }

    fn show_error(&self, message: &str) {
        let mut state = self.state.lock().unwrap();
        state.error = Some(message.to_string());
        state.errors_shown.push(message.to_string());
    }

    fn hide_error(&self) {
        self.state.lock().unwrap().error = None;
    }

    fn show_quote(&self, quote: &QuoteDisplay) {
        let mut state = self.state.lock().unwrap();
        state.quote = Some(quote.clone());
        state.quotes_shown += 1;
    }

    fn hide_quote(&self) {
        self.state.lock().unwrap().quote = None;
    }

    fn render_history(&self, history: &HistoryView) {
        let mut state = self.state.lock().unwrap();
        state.history = Some(history.clone());
        state.history_renders += 1;
    }

    fn set_total_generated(&self, total: u64) {
        self.state.lock().unwrap().total_generated = Some(total);
    }

    fn render_quote_list(&self, list: &QuoteListView) {
        let mut state = self.state.lock().unwrap();
        state.list = Some(list.clone());
        state.list_renders.push(list.clone());
    }

    fn apply_theme(&self, theme: Theme) {
        self.state.lock().unwrap().theme = Some(theme);
    }

    fn copy_to_clipboard(&self, text: &str) {
        self.state.lock().unwrap().clipboard = Some(text.to_string());
    }

    fn share(&self, text: &str) {
        self.state.lock().unwrap().shared = Some(text.to_string());
    }
}

pub(crate) struct Harness {
    pub sync: Arc<PresentationSync>,
    pub surface: Arc<RecordingSurface>,
    pub api: Arc<FakeQuoteApi>,
    pub history: Arc<HistoryStore>,
    pub kv: Arc<MemoryStore>,
}

pub(crate) async fn harness(api: FakeQuoteApi) -> Harness {
    harness_with_store(api, MemoryStore::new()).await
}

pub(crate) async fn harness_with_store(api: FakeQuoteApi, kv: MemoryStore) -> Harness {
    harness_with_options(
        api,
        kv,
        SyncOptions {
            refresh_delay: Duration::from_millis(20),
            refresh_after_generate: true,
            list_limit: 20,
        },
    )
    .await
}

pub(crate) async fn harness_with_options(
    api: FakeQuoteApi,
    kv: MemoryStore,
    options: SyncOptions,
) -> Harness {
    let api = Arc::new(api);
    let kv = Arc::new(kv);
    let dyn_kv: Arc<dyn KeyValueStore> = kv.clone();
    let history = Arc::new(HistoryStore::open(dyn_kv.clone()).await);
    let theme = ThemeStore::open(dyn_kv).await;
    let surface = Arc::new(RecordingSurface::default());

    let sync = PresentationSync::new(
        surface.clone(),
        api.clone(),
        history.clone(),
        theme,
        options,
    );

    Harness {
        sync,
        surface,
        api,
        history,
        kv,
    }
}

/// Polls `condition` until it holds or a second has passed.
pub(crate) async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
