//! 画像 → 下書きのパイプライン
//!
//! (検出 →) 生成 → 透かし の順に1段ずつ待ってから次へ進む。
//! 透かしは下書きを表示した後に回してもよいので generate_draft と分けてある。

use crate::detector::ObjectDetector;
use crate::error::{ListingError, Result};
use crate::generator::{ContentGenerator, Strategy};
use crate::watermark::WatermarkProcessor;
use listing_ai_common::{CapturedImage, DetectedObject, ListingDraft};
use tracing::info;

/// 出品可否の事前確認結果（否定でも続行できる）
#[derive(Debug, Clone, PartialEq)]
pub struct Screening {
    pub detection: DetectedObject,
    pub eligible: bool,
}

pub struct ListingPipeline {
    generator: ContentGenerator,
    watermark: WatermarkProcessor,
}

impl ListingPipeline {
    pub fn new(generator: ContentGenerator, watermark: WatermarkProcessor) -> Self {
        Self {
            generator,
            watermark,
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.generator.strategy()
    }

    pub fn generator(&self) -> &ContentGenerator {
        &self.generator
    }

    /// 代表画像の検出と出品可否（定型文方式のみ）
    pub async fn screen(&self, images: &[CapturedImage]) -> Option<Screening> {
        let detection = self.generator.screen(images).await?;
        let eligible = ObjectDetector::is_eligible_for_marketplace(&detection.object_class);
        info!(
            "事前確認: {} ({}%) → {}",
            detection.object_class,
            detection.confidence_percent(),
            if eligible { "出品可" } else { "要確認" }
        );
        Some(Screening {
            detection,
            eligible,
        })
    }

    /// 生成して下書きを作る（透かしはまだ）
    pub async fn generate_draft(
        &self,
        images: Vec<CapturedImage>,
        hint: Option<&DetectedObject>,
    ) -> Result<ListingDraft> {
        if images.is_empty() {
            return Err(ListingError::NoImages);
        }

        let generation = self.generator.generate(&images, hint).await?;
        info!(
            "生成完了 [{}]: {}",
            self.generator.strategy(),
            generation.content.title
        );
        Ok(ListingDraft::from_generated(
            images,
            generation.content,
            generation.detection,
        )?)
    }

    pub async fn watermark(&self, draft: &mut ListingDraft) -> Result<()> {
        self.watermark_with_progress(draft, |_, _| {}).await
    }

    pub async fn watermark_with_progress<F>(&self, draft: &mut ListingDraft, on_progress: F) -> Result<()>
    where
        F: FnMut(usize, usize),
    {
        let images = self
            .watermark
            .apply_with_progress(draft.images().to_vec(), on_progress)
            .await;
        draft.replace_images(images)?;
        Ok(())
    }

    /// 生成と透かしを続けて実行
    pub async fn run(
        &self,
        images: Vec<CapturedImage>,
        hint: Option<&DetectedObject>,
    ) -> Result<ListingDraft> {
        let mut draft = self.generate_draft(images, hint).await?;
        self.watermark(&mut draft).await?;
        Ok(draft)
    }

    /// 残っている画像で生成からやり直す（利用者の明示的な操作）
    ///
    /// 編集内容は破棄される。透かし済み画像はそのまま引き継ぐ。
    pub async fn regenerate(&self, draft: &ListingDraft) -> Result<ListingDraft> {
        info!("再生成: {}枚", draft.images().len());
        self.run(draft.images().to_vec(), None).await
    }
}
