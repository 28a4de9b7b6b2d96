use thiserror::Error;

#[derive(Error, Debug)]
pub enum VocabCropError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。環境変数 GEMINI_API_KEY か `vocab-crop config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("パスが見つかりません: {0}")]
    PathNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("内容を検出できませんでした（カード0件）")]
    NoContentDetected,

    #[error("切り抜きエラー: {0}")]
    Crop(#[from] crate::cropper::CropError),

    #[error("結果集計エラー: {0}")]
    Accumulator(String),

    #[error("ZIP生成エラー: {0}")]
    Archive(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("出力する結果がありません")]
    NothingToExport,

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] vocab_crop_common::Error),
}

pub type Result<T> = std::result::Result<T, VocabCropError>;
