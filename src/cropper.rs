//! 画像切り抜きモジュール
//!
//! 正規化ボックスをピクセル矩形に変換し、等倍で切り抜いてJPEGにエンコードする。
//! デコード/エンコードはブロッキングプールで実行する。

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, RgbImage};
use std::sync::Arc;
use thiserror::Error;
use vocab_crop_common::{CropRegion, CroppedImage, NormalizedBox};

pub const DEFAULT_QUALITY: u8 = 90;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CropError {
    #[error("画像デコード失敗: {0}")]
    Load(String),

    #[error("JPEGエンコード失敗: {0}")]
    Encode(String),

    #[error("不正なボックス: {0}")]
    InvalidBox(String),

    #[error("切り抜きタスク失敗: {0}")]
    Task(String),
}

/// デコード済みのソース画像
///
/// ファイル1枚の処理スコープで保持し、スコープを抜けると解放される。
#[derive(Clone)]
pub struct SourceImage {
    pixels: Arc<RgbImage>,
}

impl SourceImage {
    /// バイト列からデコード
    pub async fn decode(data: Arc<[u8]>) -> Result<Self, CropError> {
        tokio::task::spawn_blocking(move || Self::decode_blocking(&data))
            .await
            .map_err(|e| CropError::Task(e.to_string()))?
    }

    pub fn decode_blocking(data: &[u8]) -> Result<Self, CropError> {
        let decoded = image::load_from_memory(data)
            .map_err(|e| CropError::Load(e.to_string()))?;
        Ok(Self {
            pixels: Arc::new(decoded.to_rgb8()),
        })
    }

    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels: Arc::new(pixels) }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Cropper {
    quality: u8,
}

impl Default for Cropper {
    fn default() -> Self {
        Self::new(DEFAULT_QUALITY)
    }
}

impl Cropper {
    /// JPEG品質（1〜100）を指定して生成
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// 正規化ボックスの領域を切り抜く
    pub async fn crop(&self, source: &SourceImage, box_2d: &NormalizedBox) -> Result<CroppedImage, CropError> {
        let region = self.region_for(source, box_2d)?;
        let pixels = Arc::clone(&source.pixels);
        let quality = self.quality;

        tokio::task::spawn_blocking(move || crop_region(&pixels, region, quality))
            .await
            .map_err(|e| CropError::Task(e.to_string()))?
    }

    /// 同期版（ブロッキングコンテキスト用）
    pub fn crop_blocking(&self, source: &SourceImage, box_2d: &NormalizedBox) -> Result<CroppedImage, CropError> {
        let region = self.region_for(source, box_2d)?;
        crop_region(&source.pixels, region, self.quality)
    }

    fn region_for(&self, source: &SourceImage, box_2d: &NormalizedBox) -> Result<CropRegion, CropError> {
        let rect = box_2d
            .to_pixel_rect(source.width(), source.height())
            .map_err(|e| CropError::InvalidBox(e.to_string()))?;

        // キャンバスはソース画像より大きくしない
        let mut region = rect.to_crop_region();
        region.width = region.width.min(source.width().max(1));
        region.height = region.height.min(source.height().max(1));
        Ok(region)
    }
}

/// 領域サイズちょうどのキャンバスに等倍でコピーしてJPEG化
///
/// 画像外の部分は黒のまま残る。
fn crop_region(pixels: &RgbImage, region: CropRegion, quality: u8) -> Result<CroppedImage, CropError> {
    let mut canvas = RgbImage::new(region.width, region.height);
    imageops::replace(&mut canvas, pixels, -region.x, -region.y);

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode_image(&canvas)
        .map_err(|e| CropError::Encode(e.to_string()))?;

    if jpeg.is_empty() {
        return Err(CropError::Encode("出力が空です".into()));
    }

    Ok(CroppedImage {
        width: region.width,
        height: region.height,
        jpeg,
    })
}
