use chrono::{DateTime, Local, Utc};
use shared::domain::Quote;

/// Human-readable age of `at` relative to `now`: "Just now", then minutes,
/// hours and days, then a calendar date once a week has passed.
pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - at).num_minutes();
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} min{} ago", plural(minutes));
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hour{} ago", plural(hours));
    }

    let days = hours / 24;
    if days < 7 {
        return format!("{days} day{} ago", plural(days));
    }

    format_date(at)
}

/// Calendar date in the local timezone, `M/D/YYYY`.
pub fn format_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%-m/%-d/%Y").to_string()
}

fn plural(value: i64) -> &'static str {
    if value == 1 {
        ""
    } else {
        "s"
    }
}

pub fn quoted(text: &str) -> String {
    format!("\"{text}\"")
}

pub fn author_line(author: &str) -> String {
    format!("— {author}")
}

pub fn copy_text(quote: &Quote) -> String {
    format!("{}\n{}", quoted(&quote.text), author_line(&quote.author))
}

pub fn share_text(quote: &Quote) -> String {
    format!("{} {}", quoted(&quote.text), author_line(&quote.author))
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
