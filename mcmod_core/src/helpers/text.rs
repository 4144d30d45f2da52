//! Text helpers shared by the engines and the notice renderers.

use chrono::DateTime;
use teloxide::{types::UserId, utils::html};

/// True if the advertising hashtag appears anywhere in the text.
pub fn has_hashtag(text: &str, tag: &str) -> bool {
    text.to_lowercase().contains(&tag.to_lowercase())
}

/// True if the text ends with the advertising hashtag, trailing whitespace allowed.
pub fn hashtag_at_end(text: &str, tag: &str) -> bool {
    text.to_lowercase()
        .trim_end()
        .ends_with(&tag.to_lowercase())
}

/// Caps a message snapshot to `max_chars` characters (not bytes).
pub fn snippet(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Shortens text for display, appending an ellipsis when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() > max_chars {
        format!("{}…", snippet(text, max_chars))
    } else {
        text.to_string()
    }
}

/// Clickable HTML mention, by username when known, otherwise by id.
pub fn user_link(user_id: UserId, name: &str, username: Option<&str>) -> String {
    let name = if name.trim().is_empty() { "User" } else { name };
    let safe_name = html::escape(name);
    match username {
        Some(username) => format!(
            "<a href=\"https://t.me/{}\">{}</a>",
            html::escape(username),
            safe_name
        ),
        None => format!("<a href=\"tg://user?id={}\">{}</a>", user_id.0, safe_name),
    }
}

/// Formats an optional unix timestamp, `None` meaning no expiry.
pub fn format_until(timestamp: Option<i64>) -> String {
    match timestamp {
        None => "forever".to_string(),
        Some(ts) => DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.format("%d.%m.%Y %H:%M UTC").to_string())
            .unwrap_or_else(|| ts.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAG: &str = "#реклама";

    #[test]
    fn test_has_hashtag_anywhere() {
        assert!(has_hashtag("#реклама selling stuff", TAG));
        assert!(has_hashtag("selling #РЕКЛАМА stuff", TAG));
        assert!(!has_hashtag("selling stuff", TAG));
    }

    #[test]
    fn test_hashtag_at_end_allows_trailing_whitespace() {
        assert!(hashtag_at_end("Selling a diamond pickaxe #реклама", TAG));
        assert!(hashtag_at_end("Selling a diamond pickaxe #Реклама  \n", TAG));
        assert!(!hashtag_at_end("#реклама Selling a diamond pickaxe", TAG));
        assert!(!hashtag_at_end("Selling #реклама pickaxe", TAG));
    }

    #[test]
    fn test_snippet_counts_chars() {
        assert_eq!(snippet("привет мир", 6), "привет");
        assert_eq!(snippet("abc", 10), "abc");
    }

    #[test]
    fn test_preview_appends_ellipsis() {
        assert_eq!(preview("abcdef", 3), "abc…");
        assert_eq!(preview(" abc ", 3), "abc");
    }

    #[test]
    fn test_user_link_escapes_name() {
        assert_eq!(
            user_link(UserId(42), "<Steve>", None),
            "<a href=\"tg://user?id=42\">&lt;Steve&gt;</a>"
        );
        assert_eq!(
            user_link(UserId(42), "Steve", Some("steve_mc")),
            "<a href=\"https://t.me/steve_mc\">Steve</a>"
        );
    }

    #[test]
    fn test_format_until() {
        assert_eq!(format_until(None), "forever");
        assert_eq!(format_until(Some(0)), "01.01.1970 00:00 UTC");
    }
}
