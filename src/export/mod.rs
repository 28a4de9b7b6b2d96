pub mod archive;
pub mod excel;

use crate::cli::ExportFormat;
use crate::error::{VocabCropError, Result};
use std::path::{Path, PathBuf};
use vocab_crop_common::{HeaderLanguage, VocabResult};

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub header: HeaderLanguage,
    /// ZIP内のサブフォルダ名
    pub archive_folder: Option<String>,
}

/// 書き出したファイル
#[derive(Debug, Clone, Default)]
pub struct ExportedFiles {
    pub excel: Option<PathBuf>,
    pub archive: Option<PathBuf>,
}

fn output_path_for(output_dir: &Path, stem: &str, extension: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", stem, extension))
}

pub fn export_results(
    results: &[VocabResult],
    format: ExportFormat,
    output_dir: &Path,
    stem: &str,
    options: &ExportOptions,
) -> Result<ExportedFiles> {
    if results.is_empty() {
        return Err(VocabCropError::NothingToExport);
    }

    std::fs::create_dir_all(output_dir)?;
    let mut exported = ExportedFiles::default();

    if matches!(format, ExportFormat::Excel | ExportFormat::Both) {
        let path = output_path_for(output_dir, stem, "xlsx");
        println!("- Excelを生成中...");
        excel::generate_excel(results, &path, options.header)?;
        println!("✔ Excel出力: {}", path.display());
        exported.excel = Some(path);
    }

    if matches!(format, ExportFormat::Zip | ExportFormat::Both) {
        let path = output_path_for(output_dir, stem, "zip");
        println!("- ZIPを生成中...");
        archive::generate_archive(results, &path, options.archive_folder.as_deref())?;
        println!("✔ ZIP出力: {}", path.display());
        exported.archive = Some(path);
    }

    Ok(exported)
}
