//! Text item format strings.
//!
//! `\x` yields `x` literally and `%x` expands token `x` when the event
//! allows it. Disallowed or unknown tokens vanish together with their `%`.

use std::fmt::Write as _;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

use crate::event::EventInfo;
use crate::theme::ThemeOptions;

/// Expand `format` for `info` at wall-clock time `now`.
pub fn expand_format(
    format: &str,
    info: &EventInfo,
    options: &ThemeOptions,
    now: &DateTime<Local>,
) -> String {
    let allowed = info.event.tokens;
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '%' => {
                let Some(token) = chars.next() else {
                    break;
                };
                if allowed.contains(token) {
                    expand_token(&mut out, token, info, options, now);
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn expand_token(
    out: &mut String,
    token: char,
    info: &EventInfo,
    options: &ThemeOptions,
    now: &DateTime<Local>,
) {
    match token {
        '%' => out.push('%'),
        'Y' => out.push_str(&strftime(now, "%Y")),
        'y' => out.push_str(&strftime(now, "%y")),
        'M' => out.push_str(&strftime(now, "%m")),
        'd' => out.push_str(&strftime(now, "%d")),
        'H' => out.push_str(&strftime(now, "%H")),
        'h' => out.push_str(&strftime(now, "%I")),
        'm' => out.push_str(&strftime(now, "%M")),
        's' => out.push_str(&strftime(now, "%S")),
        't' => out.push_str(&now.timestamp().to_string()),
        'D' => out.push_str(&strftime(now, &options.date_format)),
        'T' => out.push_str(&strftime(now, &options.time_format)),
        'S' => out.push_str(info.source.as_deref().unwrap_or_default()),
        'R' => out.push_str(info.title.as_deref().unwrap_or_default()),
        'r' => out.push_str(info.content.as_deref().unwrap_or_default()),
        _ => {}
    }
}

/// Format `now` with a user-supplied strftime string. Invalid strings
/// expand to nothing.
pub fn strftime(now: &DateTime<Local>, format: &str) -> String {
    let items: Vec<Item<'_>> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| *item == Item::Error) {
        tracing::warn!(format, "Invalid time format in theme");
        return String::new();
    }
    let mut out = String::new();
    if write!(out, "{}", now.format_with_items(items.iter())).is_err() {
        tracing::warn!(format, "Time format could not be applied");
        return String::new();
    }
    out
}
