use super::*;
use chrono::Duration;
use shared::domain::HistoryEntry;

fn sample_quote() -> Quote {
    Quote {
        text: "Keep going".into(),
        tag: "motivation".into(),
        author: "engine-A".into(),
        source: None,
        latency_ms: Some(412),
        created_at: Utc::now(),
    }
}

#[test]
fn quote_display_wraps_text_and_names_source() {
    let display = QuoteDisplay::from_quote(&sample_quote());
    assert_eq!(display.text, "\"Keep going\"");
    assert_eq!(display.tag, "motivation");
    assert_eq!(display.source_line, "Generated by engine-A");
    assert_eq!(display.author_line, "— engine-A");
    assert_eq!(display.latency.as_deref(), Some("412ms"));
}

#[test]
fn quote_display_shows_source_and_author_separately() {
    let quote = Quote {
        author: "AI".into(),
        source: Some("engine-A".into()),
        ..sample_quote()
    };
    let display = QuoteDisplay::from_quote(&quote);

    assert_eq!(display.source_line, "Generated by engine-A");
    assert_eq!(display.author_line, "— AI");
}

#[test]
fn empty_history_has_placeholder() {
    let view = HistoryView::from_log(&HistoryLog::new(), Utc::now());
    assert_eq!(
        view,
        HistoryView::Empty {
            title: HISTORY_EMPTY_TITLE.into(),
            hint: HISTORY_EMPTY_HINT.into(),
        }
    );
}

#[test]
fn history_items_follow_log_order() {
    let now = Utc::now();
    let mut log = HistoryLog::new();
    let mut older = sample_quote();
    older.text = "Older".into();
    log.push_front(HistoryEntry::capture(older, now - Duration::hours(3)));
    log.push_front(HistoryEntry::capture(sample_quote(), now));

    let HistoryView::Items(items) = HistoryView::from_log(&log, now) else {
        panic!("expected items");
    };
    assert_eq!(items[0].text, "\"Keep going\"");
    assert_eq!(items[0].time_ago, "Just now");
    assert_eq!(items[1].time_ago, "3 hours ago");
    assert_eq!(items[1].author_line, "— engine-A");
}

#[test]
fn list_placeholders_are_distinct() {
    let empty = QuoteListView::from_quotes(&[], Utc::now());
    assert_eq!(empty.placeholder(), Some(LIST_EMPTY_MESSAGE));
    assert_eq!(QuoteListView::Loading.placeholder(), Some(LIST_LOADING_MESSAGE));
    assert_eq!(QuoteListView::Failed.placeholder(), Some(LIST_FAILED_MESSAGE));
    assert_ne!(LIST_EMPTY_MESSAGE, HISTORY_EMPTY_TITLE);
}
