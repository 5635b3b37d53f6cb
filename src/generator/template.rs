use super::Generation;
use crate::detector::ObjectDetector;
use crate::error::Result;
use listing_ai_common::{template_content, CapturedImage, DetectedObject};
use tracing::debug;

/// 定型文による生成（ネットワークなし）
pub struct TemplateGenerator {
    detector: ObjectDetector,
}

impl TemplateGenerator {
    pub fn new(detector: ObjectDetector) -> Self {
        Self { detector }
    }

    pub fn detector(&self) -> &ObjectDetector {
        &self.detector
    }

    /// ヒントがなければ代表画像を検出してから定型文を引く
    pub async fn generate(
        &self,
        images: &[CapturedImage],
        hint: Option<&DetectedObject>,
    ) -> Result<Generation> {
        let detection = match hint {
            Some(detected) => detected.clone(),
            None => match images.first() {
                Some(primary) => self.detector.detect(primary).await,
                None => DetectedObject::unknown(),
            },
        };

        let content = template_content(&detection.object_class);
        debug!(
            "定型文: {} → {} ({})",
            detection.object_class, content.title, content.suggested_price
        );

        Ok(Generation {
            content,
            detection: Some(detection),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_ai_common::Condition;

    #[tokio::test]
    async fn test_generate_with_hint() {
        let generator = TemplateGenerator::new(ObjectDetector::default());
        let hint = DetectedObject::new("Phone", 0.92);
        let generation = generator
            .generate(&[CapturedImage::camera("/nonexistent/x.jpg")], Some(&hint))
            .await
            .unwrap();

        assert_eq!(generation.content.title, "Smartphone - Unlocked and Ready to Use");
        assert_eq!(generation.content.suggested_price, 130.0); // 200 × 0.65
        assert_eq!(generation.detection, Some(hint));
    }

    #[tokio::test]
    async fn test_generate_detects_primary_image() {
        let dir = tempfile::tempdir().unwrap();
        let primary = dir.path().join("my_book.jpg");
        let second = dir.path().join("laptop.jpg");
        std::fs::write(&primary, b"x").unwrap();
        std::fs::write(&second, b"x").unwrap();

        let generator = TemplateGenerator::new(ObjectDetector::default());
        let images = vec![
            CapturedImage::camera(primary.display().to_string()),
            CapturedImage::gallery(second.display().to_string()),
        ];
        let generation = generator.generate(&images, None).await.unwrap();

        assert_eq!(generation.detection.unwrap().object_class, "book");
        assert_eq!(generation.content.condition, Condition::LikeNew);
    }

    #[tokio::test]
    async fn test_generate_unknown_falls_back_to_generic() {
        let generator = TemplateGenerator::new(ObjectDetector::default());
        let generation = generator
            .generate(&[CapturedImage::camera("/nonexistent/img_0001.jpg")], None)
            .await
            .unwrap();

        assert_eq!(generation.detection, Some(DetectedObject::unknown()));
        assert_eq!(generation.content.title, "Unknown for Sale");
        assert_eq!(generation.content.suggested_price, 16.0);
    }
}
