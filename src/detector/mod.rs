//! 物体検出
//!
//! 1枚の画像を粗いクラスに分類する。内部エラーは呼び出し元へ伝えず、
//! 番兵値 {unknown, 0} を返す。confidence = 0 は「有効な信号なし」。

mod keyword;

pub use keyword::KeywordDetector;

use async_trait::async_trait;
use listing_ai_common::{is_eligible_for_marketplace, CapturedImage, DetectedObject};
use tracing::{debug, warn};

/// 検出バックエンド
#[async_trait]
pub trait DetectionBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn classify(&self, image: &CapturedImage) -> anyhow::Result<DetectedObject>;
}

pub struct ObjectDetector {
    backend: Box<dyn DetectionBackend>,
}

impl ObjectDetector {
    pub fn new(backend: impl DetectionBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// 1枚の画像を分類（失敗時は番兵値）
    pub async fn detect(&self, image: &CapturedImage) -> DetectedObject {
        match self.backend.classify(image).await {
            Ok(detected) => {
                debug!(
                    "検出 [{}]: {} ({}%)",
                    self.backend.name(),
                    detected.object_class,
                    detected.confidence_percent()
                );
                detected
            }
            Err(e) => {
                warn!(
                    "物体検出に失敗 [{}] {}: {}",
                    self.backend.name(),
                    image.source_uri(),
                    e
                );
                DetectedObject::unknown()
            }
        }
    }

    /// 出品に適した物かの簡易判定（否定結果は利用者が上書きできる）
    pub fn is_eligible_for_marketplace(object_class: &str) -> bool {
        is_eligible_for_marketplace(object_class)
    }
}

impl Default for ObjectDetector {
    fn default() -> Self {
        Self::new(KeywordDetector)
    }
}
