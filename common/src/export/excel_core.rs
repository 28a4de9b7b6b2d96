//! Excel生成（共通ライブラリ）
//!
//! 単語一覧を1シートのExcelとして生成

use crate::error::{Error, Result};
use crate::naming::normalize_word;
use crate::types::VocabResult;
use rust_xlsxwriter::*;
use serde::{Deserialize, Serialize};

const SHEET_NAME: &str = "Vocabulary";
const INDEX_COL_WIDTH: f64 = 8.0;
const WORD_COL_WIDTH: f64 = 32.0;

/// ヘッダー行の言語
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderLanguage {
    #[default]
    Zh,
    En,
}

impl HeaderLanguage {
    /// (連番列, 単語列) の見出し
    pub fn labels(&self) -> (&'static str, &'static str) {
        match self {
            HeaderLanguage::Zh => ("序号", "单词"),
            HeaderLanguage::En => ("Index", "Word"),
        }
    }
}

/// 単語データのトレイト（VocabResult以外の一覧にも対応）
pub trait WordEntry {
    fn word(&self) -> &str;
}

impl WordEntry for VocabResult {
    fn word(&self) -> &str { &self.word }
}

impl WordEntry for String {
    fn word(&self) -> &str { self }
}

impl WordEntry for &str {
    fn word(&self) -> &str { self }
}

/// Excelをバッファに生成
///
/// 連番は最終的な表示順（1始まり）。単語は `normalize_word` を通した値を書く。
///
/// # Arguments
/// * `entries` - 単語データ（WordEntryトレイトを実装した型）
/// * `header` - ヘッダー行の言語
pub fn generate_excel_buffer<T: WordEntry>(entries: &[T], header: HeaderLanguage) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let index_format = Format::new().set_align(FormatAlign::Center);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)
        .map_err(|e| Error::Excel(format!("シート名設定エラー: {}", e)))?;

    worksheet.set_column_width(0, INDEX_COL_WIDTH)
        .map_err(|e| Error::Excel(format!("列幅設定エラー: {}", e)))?;
    worksheet.set_column_width(1, WORD_COL_WIDTH)
        .map_err(|e| Error::Excel(format!("列幅設定エラー: {}", e)))?;

    let (index_label, word_label) = header.labels();
    worksheet.write_string_with_format(0, 0, index_label, &header_format)
        .map_err(|e| Error::Excel(format!("ヘッダー書き込みエラー: {}", e)))?;
    worksheet.write_string_with_format(0, 1, word_label, &header_format)
        .map_err(|e| Error::Excel(format!("ヘッダー書き込みエラー: {}", e)))?;
    worksheet.set_freeze_panes(1, 0)
        .map_err(|e| Error::Excel(format!("ウィンドウ枠固定エラー: {}", e)))?;

    for (i, entry) in entries.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_number_with_format(row, 0, (i + 1) as f64, &index_format)
            .map_err(|e| Error::Excel(format!("連番書き込みエラー: {}", e)))?;
        worksheet.write_string(row, 1, normalize_word(entry.word()))
            .map_err(|e| Error::Excel(format!("単語書き込みエラー: {}", e)))?;
    }

    // バッファに書き出し
    workbook.save_to_buffer()
        .map_err(|e| Error::Excel(format!("Excel保存エラー: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_labels() {
        assert_eq!(HeaderLanguage::Zh.labels(), ("序号", "单词"));
        assert_eq!(HeaderLanguage::En.labels(), ("Index", "Word"));
        assert_eq!(HeaderLanguage::default(), HeaderLanguage::Zh);
    }

    #[test]
    fn test_generate_buffer_is_xlsx() {
        let words = vec!["apple".to_string(), "Red_Fox".to_string()];
        let buffer = generate_excel_buffer(&words, HeaderLanguage::En).unwrap();
        // xlsx はZIPコンテナ
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn test_generate_buffer_empty() {
        let words: Vec<String> = vec![];
        assert!(generate_excel_buffer(&words, HeaderLanguage::Zh).is_ok());
    }
}
