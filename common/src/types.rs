//! 単語カードの型定義
//!
//! - DetectedItem: 認識APIの出力（単語 + 正規化ボックス）
//! - CroppedImage: 切り抜き済みの画像データ
//! - VocabResult: 最終出力（連番 + 単語 + 画像）

use crate::geometry::NormalizedBox;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// 認識APIが返すカード1件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedItem {
    pub word: String,
    pub box_2d: NormalizedBox,
}

/// 切り抜き済み画像（JPEG）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

impl CroppedImage {
    /// 表示用のData URL
    pub fn data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.jpeg);
        format!("data:image/jpeg;base64,{}", encoded)
    }
}

/// 単語カード1件の最終結果
#[derive(Debug, Clone, PartialEq)]
pub struct VocabResult {
    /// 表示順の連番（1始まり）
    pub id: usize,
    /// トリム済みの単語
    pub word: String,
    /// 元画像のファイル名
    pub source_file: String,
    pub image: CroppedImage,
}
