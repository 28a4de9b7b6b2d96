use crate::error::{VocabCropError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub mime: String,
}

/// MIMEタイプが画像かどうか
pub fn is_image_mime(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

/// 拡張子からMIMEタイプを推定
pub fn guess_mime(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
}

/// 入力パス（ファイル/フォルダ）から画像を収集
///
/// - フォルダは直下のみ（`recursive` で再帰）、ファイル名順
/// - ファイル指定は引数の順序を維持
/// - 画像以外のMIMEタイプは除外
pub fn collect_images(paths: &[PathBuf], recursive: bool) -> Result<Vec<ImageInfo>> {
    let mut images = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(VocabCropError::PathNotFound(path.display().to_string()));
        }

        if path.is_dir() {
            images.extend(scan_folder(path, recursive)?);
        } else if let Some(info) = image_info(path) {
            images.push(info);
        } else {
            tracing::debug!(path = %path.display(), "画像以外のファイルをスキップ");
        }
    }

    Ok(images)
}

pub fn scan_folder(folder: &Path, recursive: bool) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(VocabCropError::PathNotFound(folder.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        match image_info(path) {
            Some(info) => images.push(info),
            None => tracing::debug!(path = %path.display(), "画像以外のファイルをスキップ"),
        }
    }

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

fn image_info(path: &Path) -> Option<ImageInfo> {
    let mime = guess_mime(path).filter(|m| is_image_mime(m))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Some(ImageInfo {
        path: path.to_path_buf(),
        file_name,
        mime,
    })
}
