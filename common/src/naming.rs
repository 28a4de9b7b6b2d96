//! 単語の正規化とファイル名生成
//!
//! Excelの単語列とZIPのファイル名は同じ正規化を通すので、両者は常に一致する。

use lazy_static::lazy_static;
use regex::Regex;

/// アーカイブ内の画像拡張子
pub const IMAGE_EXTENSION: &str = "jpg";

const REPLACEMENT: &str = "_";
const FALLBACK_STEM: &str = "untitled";

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r#"[\\/:*?"<>|]"#).unwrap();
}

/// 単語を正規化（アンダースコア → スペース、前後の空白を除去）
pub fn normalize_word(word: &str) -> String {
    word.replace('_', " ").trim().to_string()
}

/// パスに使えない文字を置換
pub fn sanitize_file_stem(word: &str) -> String {
    let sanitized = UNSAFE_CHARS.replace_all(word, REPLACEMENT);
    if sanitized.trim().is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        sanitized.into_owned()
    }
}

/// アーカイブのエントリ名（連番は付けない）
///
/// # Examples
/// ```
/// use vocab_crop_common::archive_entry_name;
///
/// assert_eq!(archive_entry_name("Red Fox"), "Red Fox.jpg");
/// assert_eq!(archive_entry_name("a/b"), "a_b.jpg");
/// ```
pub fn archive_entry_name(word: &str) -> String {
    format!("{}.{}", sanitize_file_stem(&normalize_word(word)), IMAGE_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("  Red Fox "), "Red Fox");
        assert_eq!(normalize_word("ice_cream"), "ice cream");
        assert_eq!(normalize_word("_tail_"), "tail");
        assert_eq!(normalize_word("苹果"), "苹果");
    }

    #[test]
    fn test_sanitize_all_unsafe_chars() {
        assert_eq!(sanitize_file_stem(r#"a\b/c:d*e?f"g<h>i|j"#), "a_b_c_d_e_f_g_h_i_j");
    }

    #[test]
    fn test_sanitize_keeps_safe_text() {
        assert_eq!(sanitize_file_stem("Red Fox"), "Red Fox");
        assert_eq!(sanitize_file_stem("naïve café"), "naïve café");
    }

    #[test]
    fn test_sanitize_empty_fallback() {
        assert_eq!(sanitize_file_stem(""), "untitled");
        assert_eq!(sanitize_file_stem("   "), "untitled");
    }

    #[test]
    fn test_archive_entry_name() {
        assert_eq!(archive_entry_name("Red Fox"), "Red Fox.jpg");
        assert_eq!(archive_entry_name("a/b"), "a_b.jpg");
        assert_eq!(archive_entry_name(" polar_bear "), "polar bear.jpg");
        assert_eq!(archive_entry_name("___"), "untitled.jpg");
    }

    #[test]
    fn test_archive_name_matches_spreadsheet_word() {
        for word in ["Red Fox", "ice_cream", "  dog  ", "長颈鹿"] {
            let cell = normalize_word(word);
            assert_eq!(archive_entry_name(word), format!("{}.jpg", cell));
        }
    }
}
