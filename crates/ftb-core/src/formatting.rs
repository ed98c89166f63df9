//! Text helpers shared by the command handlers and the model clients.

/// Split `text` into chunks of at most `limit` characters.
///
/// Prefers breaking after a newline, then after whitespace, falling back
/// to a hard cut. The limit counts characters, not bytes: the platform
/// limit is measured in characters and a cut must never land inside a
/// UTF-8 sequence.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    assert!(limit > 0, "chunk limit must be positive");

    let mut out = Vec::new();
    let mut rest = text;

    loop {
        // Byte offset of the char just past the window; None means the
        // remainder already fits.
        let Some(window_end) = rest.char_indices().nth(limit).map(|(i, _)| i) else {
            if !rest.is_empty() {
                out.push(rest.to_string());
            }
            return out;
        };

        let window = &rest[..window_end];
        let cut = window
            .rfind('\n')
            .map(|i| i + 1)
            .or_else(|| {
                window.rfind(char::is_whitespace).map(|i| {
                    i + window[i..].chars().next().map(char::len_utf8).unwrap_or(1)
                })
            })
            .unwrap_or(window_end);

        out.push(rest[..cut].to_string());
        rest = &rest[cut..];
    }
}

/// Escape untrusted text for inclusion in a log line: newlines, quotes
/// and control characters become visible escapes so one message cannot
/// forge extra log records.
pub fn escape_for_log(text: &str) -> String {
    text.chars().flat_map(char::escape_default).collect()
}
