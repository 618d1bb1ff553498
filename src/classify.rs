/*!
 * Text/binary classification helpers
 */

use std::path::Path;

/// Number of leading bytes inspected by [`is_likely_text`]
pub const SNIFF_LEN: usize = 8192;

/// Maximum share of control bytes a text sample may contain
const BINARY_RATIO_LIMIT: f32 = 0.1;

/// Guess whether `bytes` hold text.
///
/// Looks at the first [`SNIFF_LEN`] bytes: the sample must be UTF-8 (a
/// multi-byte sequence cut off by the sample boundary is fine), contain no
/// NUL byte, and at most 10% control characters other than whitespace.
/// Empty input counts as text.
pub fn is_likely_text(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(SNIFF_LEN)];
    if sample.is_empty() {
        return true;
    }

    if let Err(e) = std::str::from_utf8(sample) {
        // error_len() is None when the input merely ends mid-character
        if e.error_len().is_some() {
            return false;
        }
    }

    if sample.contains(&0) {
        return false;
    }

    let binary_count = sample
        .iter()
        .filter(|&&b| (b < 9) || (b > 13 && b < 32))
        .count();
    let binary_ratio = binary_count as f32 / sample.len() as f32;

    binary_ratio < BINARY_RATIO_LIMIT
}

/// Lower-cased extension of `path` without the leading dot, if any
pub fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert!(is_likely_text(b"hello world\nsecond line\n"));
        assert!(is_likely_text("héllo wörld".as_bytes()));
        assert!(is_likely_text(b""));
    }

    #[test]
    fn test_binary() {
        assert!(!is_likely_text(&[0u8, 1, 2, 3]));
        assert!(!is_likely_text(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]));
        assert!(!is_likely_text(b"text with a \0 nul"));
    }

    #[test]
    fn test_multibyte_char_cut_at_sample_boundary() {
        let mut bytes = vec![b'a'; SNIFF_LEN - 1];
        bytes.extend_from_slice("é".as_bytes());
        assert!(is_likely_text(&bytes));
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension(Path::new("src/Main.RS")), Some("rs".to_string()));
        assert_eq!(extension(Path::new("archive.tar.gz")), Some("gz".to_string()));
        assert_eq!(extension(Path::new("Makefile")), None);
        assert_eq!(extension(Path::new(".gitignore")), None);
    }
}
