//! 認識アダプタ
//!
//! 画像1枚を外部のマルチモーダルモデルへ送り、カードの単語とボックスを受け取る。

mod gemini;

pub use gemini::GeminiRecognizer;

use crate::error::Result;
use async_trait::async_trait;
use vocab_crop_common::DetectedItem;

/// 認識に渡す画像
#[derive(Debug, Clone, Copy)]
pub struct ImagePayload<'a> {
    pub file_name: &'a str,
    pub mime: &'a str,
    pub data: &'a [u8],
}

#[async_trait]
pub trait Recognizer: Send + Sync {
    /// カードを読み取り順で返す
    ///
    /// 通信・認証の失敗は `ApiCall`、レスポンス不正は `ApiParse`。
    /// 0件は正常な戻り値で、扱いは呼び出し側のポリシーが決める。
    async fn recognize(&self, image: ImagePayload<'_>) -> Result<Vec<DetectedItem>>;
}
