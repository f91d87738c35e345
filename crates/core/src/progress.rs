//! Progress-percent parsing and user-facing status messages.

/// Message shown while a job is queued with no preview yet.
pub const MSG_QUEUED: &str = "Waiting in queue";

/// Message shown once a job's composite has been received.
pub const MSG_DONE: &str = "Done";

/// Parse a gateway progress string such as `"25%"` into a percentage.
///
/// The trailing `%` is optional and surrounding whitespace is tolerated.
/// Values above 100 clamp to 100. Malformed input yields `None` — the
/// caller treats that as "no progress information", never as an error.
pub fn parse_progress_percent(raw: &str) -> Option<u8> {
    let digits = raw.trim().trim_end_matches('%').trim();
    if digits.is_empty() {
        return None;
    }
    let value: u32 = digits.parse().ok()?;
    Some(value.min(100) as u8)
}

/// Status text for an in-progress tile, e.g. `"Rendering 25%"`.
pub fn rendering_message(percent: u8) -> String {
    format!("Rendering {percent}%")
}

/// Status text for a failed tile.
pub fn failure_message(reason: &str) -> String {
    format!("Generation failed: {reason}")
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- parse_progress_percent --

    #[test]
    fn parses_plain_percent() {
        assert_eq!(parse_progress_percent("25%"), Some(25));
        assert_eq!(parse_progress_percent("0%"), Some(0));
        assert_eq!(parse_progress_percent("100%"), Some(100));
    }

    #[test]
    fn parses_without_suffix() {
        assert_eq!(parse_progress_percent("40"), Some(40));
    }

    #[test]
    fn tolerates_whitespace() {
        assert_eq!(parse_progress_percent(" 55% "), Some(55));
        assert_eq!(parse_progress_percent("55 %"), Some(55));
    }

    #[test]
    fn clamps_overflow_to_100() {
        assert_eq!(parse_progress_percent("150%"), Some(100));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_progress_percent(""), None);
        assert_eq!(parse_progress_percent("%"), None);
        assert_eq!(parse_progress_percent("abc"), None);
        assert_eq!(parse_progress_percent("-5%"), None);
        assert_eq!(parse_progress_percent("12.5%"), None);
    }

    // -- messages --

    #[test]
    fn rendering_message_includes_percent() {
        assert_eq!(rendering_message(25), "Rendering 25%");
    }

    #[test]
    fn failure_message_includes_reason() {
        assert_eq!(
            failure_message("out of credits"),
            "Generation failed: out of credits"
        );
    }
}
