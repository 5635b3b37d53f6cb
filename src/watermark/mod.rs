//! 透かし処理
//!
//! カメラ撮影画像だけに検証マークを付ける。ギャラリー画像と透かし済み画像は
//! そのまま通す。1枚の失敗でバッチを止めず、入力と同じ長さの列を返す。

mod stamp;

pub use stamp::ImageWatermarker;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use listing_ai_common::CapturedImage;
use regex::Regex;
use tracing::{debug, info, warn};

/// 透かし済みファイル名の接頭辞
pub const WATERMARK_PREFIX: &str = "watermarked_";

/// 1枚の画像に透かしを付け、出力先のURIを返す
#[async_trait]
pub trait WatermarkPrimitive: Send + Sync {
    async fn stamp(&self, source_uri: &str) -> anyhow::Result<String>;
}

pub struct WatermarkProcessor {
    primitive: Box<dyn WatermarkPrimitive>,
}

impl WatermarkProcessor {
    pub fn new(primitive: impl WatermarkPrimitive + 'static) -> Self {
        Self {
            primitive: Box::new(primitive),
        }
    }

    pub async fn apply(&self, images: Vec<CapturedImage>) -> Vec<CapturedImage> {
        self.apply_with_progress(images, |_, _| {}).await
    }

    /// 1枚ずつ順に処理し、処理済み枚数を通知する
    pub async fn apply_with_progress<F>(
        &self,
        images: Vec<CapturedImage>,
        mut on_progress: F,
    ) -> Vec<CapturedImage>
    where
        F: FnMut(usize, usize),
    {
        let total = images.len();
        let mut processed = Vec::with_capacity(total);
        let mut stamped = 0;

        for (i, image) in images.into_iter().enumerate() {
            let result = if !image.is_from_camera() || image.is_watermarked() {
                debug!("透かし対象外: {}", image.source_uri());
                image
            } else {
                match self.stamp_one(&image).await {
                    Some(watermarked) => {
                        stamped += 1;
                        watermarked
                    }
                    None => image,
                }
            };
            processed.push(result);
            on_progress(i + 1, total);
        }

        info!("透かし処理完了: {}/{}枚", stamped, total);
        processed
    }

    async fn stamp_one(&self, image: &CapturedImage) -> Option<CapturedImage> {
        let uri = match self.primitive.stamp(image.source_uri()).await {
            Ok(uri) => uri,
            Err(e) => {
                warn!("透かしに失敗（元画像を使用）{}: {:#}", image.source_uri(), e);
                return None;
            }
        };

        match image.watermarked(uri) {
            Ok(watermarked) => Some(watermarked),
            Err(e) => {
                warn!("透かし結果を反映できません {}: {}", image.source_uri(), e);
                None
            }
        }
    }
}

/// URIの最後の要素（ファイル名）
fn file_name(uri: &str) -> &str {
    uri.rsplit(['/', '\\']).next().unwrap_or(uri)
}

/// ファイル名の接頭辞から透かし済みか判定
pub fn has_watermark(uri: &str) -> bool {
    file_name(uri).starts_with(WATERMARK_PREFIX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkInfo {
    pub has_watermark: bool,
    /// ファイル名に埋め込まれた作成時刻
    pub timestamp: Option<DateTime<Utc>>,
}

pub fn watermark_info(uri: &str) -> WatermarkInfo {
    lazy_static::lazy_static! {
        static ref MARKER_RE: Regex = Regex::new(r"^watermarked_(\d+)").unwrap();
    }

    let timestamp = MARKER_RE
        .captures(file_name(uri))
        .and_then(|cap| cap.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis);

    WatermarkInfo {
        has_watermark: has_watermark(uri),
        timestamp,
    }
}
