//! Excel生成（CLI版）
//!
//! 共通ライブラリのバッファ生成をファイルに書き出す

use crate::error::{VocabCropError, Result};
use std::path::Path;
use vocab_crop_common::{generate_excel_buffer, HeaderLanguage, VocabResult};

pub fn generate_excel(results: &[VocabResult], output_path: &Path, header: HeaderLanguage) -> Result<()> {
    let buffer = generate_excel_buffer(results, header)
        .map_err(|e| VocabCropError::ExcelGeneration(e.to_string()))?;

    std::fs::write(output_path, buffer)
        .map_err(|e| VocabCropError::ExcelGeneration(format!("ファイル書き込みエラー: {}", e)))?;

    tracing::debug!(path = %output_path.display(), rows = results.len(), "Excel出力");
    Ok(())
}
