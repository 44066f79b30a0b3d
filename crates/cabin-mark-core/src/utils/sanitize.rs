//! File-name helpers for share/download targets.

/// Make `input` safe to use as one component of a file name.
///
/// Path separators, reserved characters and control characters become
/// `_`; leading/trailing dots and spaces are trimmed. Falls back to
/// `fallback` when nothing usable remains.
pub fn sanitize_filename_component(input: &str, fallback: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }

    let mut out = String::with_capacity(trimmed.len().min(120));
    for c in trimmed.chars() {
        let forbidden = matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|')
            || c.is_control()
            || c.is_whitespace();
        out.push(if forbidden { '_' } else { c });
        if out.len() >= 120 {
            break;
        }
    }

    let out = out.trim_matches([' ', '.']).to_string();
    if out.is_empty() {
        fallback.to_string()
    } else {
        out
    }
}

/// Keep only the ASCII digits of an ISO-8601 timestamp
/// (`2025-12-24T08:15:30.123Z` -> `20251224081530123`).
pub fn compact_timestamp(timestamp: &str) -> String {
    timestamp.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_removes_path_chars() {
        let s = sanitize_filename_component("../..\\B-1234:x", "IMG");
        assert!(!s.contains('/'));
        assert!(!s.contains('\\'));
        assert!(!s.contains(':'));
        assert!(!s.starts_with('.'));
        assert!(s.contains("B-1234"));
    }

    #[test]
    fn sanitize_never_empty() {
        assert_eq!(sanitize_filename_component("   ", "IMG"), "IMG");
        assert_eq!(sanitize_filename_component("..", "IMG"), "IMG");
    }

    #[test]
    fn compact_timestamp_keeps_digits() {
        assert_eq!(compact_timestamp("2025-12-24T08:15:30Z"), "20251224081530");
    }
}
