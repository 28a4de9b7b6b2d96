//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use std::path::{Path, PathBuf};
use tempfile::tempdir;
use vocab_crop::cli::ExportFormat;
use vocab_crop::config::{ApiKey, Config};
use vocab_crop::error::VocabCropError;
use vocab_crop::export::{export_results, ExportOptions};
use vocab_crop::scanner;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"), false);
    assert!(matches!(result, Err(VocabCropError::PathNotFound(_))));
}

/// 存在しないファイルを指定した場合
#[test]
fn test_collect_nonexistent_file() {
    let result = scanner::collect_images(&[PathBuf::from("/nonexistent/card.jpg")], false);
    assert!(matches!(result, Err(VocabCropError::PathNotFound(_))));
}

/// 画像のないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let result = scanner::scan_folder(dir.path(), false);
    assert!(result.unwrap().is_empty());
}

/// 結果0件での出力
#[test]
fn test_export_without_results() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = export_results(&[], ExportFormat::Both, dir.path(), "empty", &ExportOptions::default());

    assert!(matches!(result, Err(VocabCropError::NothingToExport)));
    assert!(!dir.path().join("empty.xlsx").exists());
    assert!(!dir.path().join("empty.zip").exists());
}

/// APIキーが無いときはバッチ開始前に設定エラー
#[test]
fn test_missing_api_key_is_config_error() {
    let config = Config::default();
    let key = config.resolve_api_key_with(|_| None);
    assert_eq!(key, ApiKey::Absent);

    let err = key.into_value().unwrap_err();
    assert!(matches!(err, VocabCropError::MissingApiKey));
    assert!(err.to_string().contains("GEMINI_API_KEY"));
}

/// VocabCropErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        VocabCropError::Config("テスト設定エラー".to_string()),
        VocabCropError::PathNotFound("cards/".to_string()),
        VocabCropError::ApiCall("429 Too Many Requests".to_string()),
        VocabCropError::ApiParse("empty".to_string()),
        VocabCropError::NoContentDetected,
        VocabCropError::Archive("duplicate".to_string()),
    ];

    for err in errors {
        let msg = err.to_string();
        assert!(!msg.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 共通クレートのエラーが透過的に表示される
#[test]
fn test_common_error_is_transparent() {
    let inner = vocab_crop_common::Error::InvalidBox("ymin > ymax".to_string());
    let expected = inner.to_string();
    let err: VocabCropError = inner.into();
    assert_eq!(err.to_string(), expected);
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: VocabCropError = io_err.into();
    assert!(matches!(err, VocabCropError::Io(_)));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ broken").unwrap_err();
    let err: VocabCropError = json_err.into();
    assert!(matches!(err, VocabCropError::JsonParse(_)));
}
