//! 座標変換モジュール
//!
//! 正規化座標（0〜1000、[ymin, xmin, ymax, xmax]）からピクセル座標への変換

use crate::error::{Error, Result};
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 正規化座標のスケール
pub const NORMALIZED_SCALE: f64 = 1000.0;

/// 切り抜きの最小サイズ（px）
const MIN_SIDE_PX: f64 = 1.0;

/// 正規化バウンディングボックス
///
/// ワイヤ上は `[ymin, xmin, ymax, xmax]` の4要素配列。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub ymin: f64,
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
}

/// ピクセル座標の矩形（小数のまま保持）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// 整数ピクセルの切り抜き領域
///
/// 原点は画像外（負）もあり得る。幅・高さは常に1以上。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl NormalizedBox {
    pub fn new(ymin: f64, xmin: f64, ymax: f64, xmax: f64) -> Self {
        Self { ymin, xmin, ymax, xmax }
    }

    /// 4要素スライスから生成（[ymin, xmin, ymax, xmax]）
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        match values {
            [ymin, xmin, ymax, xmax] => Ok(Self::new(*ymin, *xmin, *ymax, *xmax)),
            _ => Err(Error::InvalidBox(format!(
                "box_2dは4要素が必要です（{}要素）",
                values.len()
            ))),
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.ymin, self.xmin, self.ymax, self.xmax]
    }

    /// ソース画像サイズに対するピクセル矩形を計算
    ///
    /// ```text
    /// sx = xmin/1000 * W
    /// sy = ymin/1000 * H
    /// sw = (xmax-xmin)/1000 * W
    /// sh = (ymax-ymin)/1000 * H
    /// ```
    ///
    /// 各座標は先に `[0, 1000]` に収める。このため矩形はソース画像の範囲を超えない
    /// （最小1pxの補正分を除く）。幅・高さは最小1px。反転したボックス（xmax < xmin 等）はエラー。
    ///
    /// # Examples
    /// ```
    /// use vocab_crop_common::NormalizedBox;
    ///
    /// let rect = NormalizedBox::new(100.0, 100.0, 300.0, 300.0)
    ///     .to_pixel_rect(1000, 1000)
    ///     .unwrap();
    /// assert_eq!((rect.x, rect.y, rect.width, rect.height), (100.0, 100.0, 200.0, 200.0));
    /// ```
    pub fn to_pixel_rect(&self, width: u32, height: u32) -> Result<PixelRect> {
        if self.to_array().iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidBox(format!("数値以外の座標: {:?}", self.to_array())));
        }
        if self.xmax < self.xmin || self.ymax < self.ymin {
            return Err(Error::InvalidBox(format!(
                "反転したボックス: [{}, {}, {}, {}]",
                self.ymin, self.xmin, self.ymax, self.xmax
            )));
        }

        let b = self.clamped();
        let w = f64::from(width);
        let h = f64::from(height);

        Ok(PixelRect {
            x: b.xmin / NORMALIZED_SCALE * w,
            y: b.ymin / NORMALIZED_SCALE * h,
            width: ((b.xmax - b.xmin) / NORMALIZED_SCALE * w).max(MIN_SIDE_PX),
            height: ((b.ymax - b.ymin) / NORMALIZED_SCALE * h).max(MIN_SIDE_PX),
        })
    }

    /// 各座標を `[0, NORMALIZED_SCALE]` に収めたボックス
    pub fn clamped(&self) -> NormalizedBox {
        let clamp = |v: f64| v.clamp(0.0, NORMALIZED_SCALE);
        NormalizedBox::new(clamp(self.ymin), clamp(self.xmin), clamp(self.ymax), clamp(self.xmax))
    }
}

impl PixelRect {
    /// 整数ピクセル領域へ変換（原点は切り捨て、サイズは切り捨て後に最小1）
    pub fn to_crop_region(&self) -> CropRegion {
        CropRegion {
            x: self.x.floor() as i64,
            y: self.y.floor() as i64,
            width: (self.width.trunc() as u32).max(1),
            height: (self.height.trunc() as u32).max(1),
        }
    }
}

impl Serialize for NormalizedBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(4)?;
        for value in self.to_array() {
            tuple.serialize_element(&value)?;
        }
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for NormalizedBox {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct BoxVisitor;

        impl<'de> Visitor<'de> for BoxVisitor {
            type Value = NormalizedBox;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an array of 4 numbers [ymin, xmin, ymax, xmax]")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
                let mut values = Vec::with_capacity(4);
                while let Some(value) = seq.next_element::<f64>()? {
                    values.push(value);
                }
                NormalizedBox::from_slice(&values).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_seq(BoxVisitor)
    }
}
