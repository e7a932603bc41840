//! Transfer-content sanitization
//!
//! Banking apps do not reliably display extended Unicode in the
//! purpose-of-transaction field, and the TLV length prefix counts
//! characters, so the free text is reduced to plain ASCII before it enters
//! the payload: accented letters lose their diacritics via NFD
//! decomposition, everything outside `[A-Za-z0-9 ]` is dropped, and runs of
//! spaces collapse.

use unicode_normalization::UnicodeNormalization;

/// Maximum length of the sanitized purpose-of-transaction text
pub const MAX_CONTENT_LEN: usize = 50;

/// Reduce free-form transfer content to ASCII letters, digits and single
/// spaces, truncated to [`MAX_CONTENT_LEN`] characters.
///
/// `đ`/`Đ` carry no combining mark and do not decompose under NFD; they are
/// transliterated explicitly so Vietnamese words keep the letter.
pub fn sanitize_content(input: &str) -> String {
    let mut out = String::with_capacity(input.len().min(MAX_CONTENT_LEN));
    let mut pending_space = false;
    for ch in input.nfd() {
        let ch = match ch {
            'đ' => 'd',
            'Đ' => 'D',
            c => c,
        };
        if ch == ' ' {
            pending_space = !out.is_empty();
        } else if ch.is_ascii_alphanumeric() {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
        // Combining marks and all other characters are dropped.
    }
    if out.len() > MAX_CONTENT_LEN {
        out.truncate(MAX_CONTENT_LEN);
        while out.ends_with(' ') {
            out.pop();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_diacritics() {
        assert_eq!(sanitize_content("Bé Ánh - LCL001"), "Be Anh LCL001");
        assert_eq!(sanitize_content("Cặp lá yêu thương"), "Cap la yeu thuong");
        assert_eq!(sanitize_content("Đỗ Văn Đức"), "Do Van Duc");
    }

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(sanitize_content("Ung ho CLYT"), "Ung ho CLYT");
        assert_eq!(sanitize_content("LCL001"), "LCL001");
    }

    #[test]
    fn test_collapses_and_trims_spaces() {
        assert_eq!(sanitize_content("  a   b  "), "a b");
        assert_eq!(sanitize_content("a -- b"), "a b");
        assert_eq!(sanitize_content("!!!"), "");
        assert_eq!(sanitize_content(""), "");
    }

    #[test]
    fn test_truncates_to_limit() {
        let long = "a".repeat(80);
        assert_eq!(sanitize_content(&long).len(), MAX_CONTENT_LEN);

        // Truncation never leaves a trailing space
        let spaced = format!("{} {}", "a".repeat(49), "b".repeat(20));
        let sanitized = sanitize_content(&spaced);
        assert_eq!(sanitized, "a".repeat(49));
    }
}
