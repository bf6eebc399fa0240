//! Helpers for keeping player-supplied text on a single line.
//!
//! Chat arguments end up both in the diagnostic log and in the mailbox file, which is
//! read line by line by administrators. Both must never be split by an embedded newline.

/// Escape a string for single-line output:
/// - `\n` => `\\n`
/// - `\r` => `\\r`
/// - `\t` => `\\t`
/// - backslash => `\\\\`
/// - other control characters => `\\xNN`
pub fn escape_line(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// Same as [`escape_line`] but capped for log previews.
pub fn escape_log(s: &str) -> String {
    const MAX_PREVIEW: usize = 200;
    let truncated: String = s.chars().take(MAX_PREVIEW).collect();
    let mut out = escape_line(&truncated);
    if s.chars().nth(MAX_PREVIEW).is_some() {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{escape_line, escape_log};

    #[test]
    fn escapes_line_breaks() {
        assert_eq!(escape_line("help\nme\r\tnow"), "help\\nme\\r\\tnow");
        assert_eq!(escape_line("a\u{7}b"), "a\\x07b");
    }

    #[test]
    fn log_preview_is_capped() {
        let long = "x".repeat(500);
        let esc = escape_log(&long);
        assert!(esc.ends_with('…'));
        assert_eq!(esc.chars().count(), 201);
        assert_eq!(escape_log("short"), "short");
    }
}
