//! 画像ZIP生成
//!
//! エントリ名は正規化した単語 + ".jpg"（連番なし）。
//! 同名の単語は1エントリにまとまり、最後の画像が残る。

use crate::error::{VocabCropError, Result};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;
use vocab_crop_common::{archive_entry_name, sanitize_file_stem, VocabResult};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// (エントリ名, JPEG) の一覧。同名は最初の位置に最後の画像を入れる。
pub fn archive_entries<'a>(results: &'a [VocabResult], folder: Option<&str>) -> Vec<(String, &'a [u8])> {
    let prefix = folder
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|f| format!("{}/", sanitize_file_stem(f)))
        .unwrap_or_default();

    let mut entries: Vec<(String, &[u8])> = Vec::with_capacity(results.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for result in results {
        let name = format!("{}{}", prefix, archive_entry_name(&result.word));
        let payload = result.image.jpeg.as_slice();

        match positions.get(&name) {
            Some(&pos) => {
                tracing::debug!(entry = %name, "同名エントリを上書き");
                entries[pos].1 = payload;
            }
            None => {
                positions.insert(name.clone(), entries.len());
                entries.push((name, payload));
            }
        }
    }

    entries
}

/// ZIPをバッファに生成
pub fn build_archive_buffer(results: &[VocabResult], folder: Option<&str>) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        // JPEGは圧縮済みなので無圧縮で格納
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        for (name, payload) in archive_entries(results, folder) {
            zip.start_file(name.as_str(), options)
                .map_err(|e| VocabCropError::Archive(format!("{}: {}", name, e)))?;
            zip.write_all(payload)?;
        }

        zip.finish()
            .map_err(|e| VocabCropError::Archive(e.to_string()))?;
    }
    Ok(buffer)
}

pub fn generate_archive(results: &[VocabResult], output_path: &Path, folder: Option<&str>) -> Result<()> {
    let buffer = build_archive_buffer(results, folder)?;
    std::fs::write(output_path, buffer)?;
    tracing::debug!(path = %output_path.display(), "ZIP出力");
    Ok(())
}
