//! ファイル名のキーワードによるオフライン分類

use super::DetectionBackend;
use async_trait::async_trait;
use listing_ai_common::eligibility::MARKETPLACE_KEYWORDS;
use listing_ai_common::{CapturedImage, DetectedObject};
use std::path::Path;

/// 許可キーワードに一致した場合の信頼度
const KEYWORD_CONFIDENCE: f64 = 0.9;

/// それ以外の語を採用した場合の信頼度
const GUESS_CONFIDENCE: f64 = 0.5;

/// カメラやOSが付ける意味のない語
const NOISE_TOKENS: &[&str] = &["img", "dsc", "dcim", "pxl", "photo", "image", "screenshot", "edited"];

pub struct KeywordDetector;

#[async_trait]
impl DetectionBackend for KeywordDetector {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn classify(&self, image: &CapturedImage) -> anyhow::Result<DetectedObject> {
        let path = Path::new(image.source_uri());
        if !tokio::fs::try_exists(path).await? {
            anyhow::bail!("画像が見つかりません: {}", path.display());
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        classify_name(&stem)
            .ok_or_else(|| anyhow::anyhow!("ファイル名から分類できません: {}", stem))
    }
}

/// ファイル名（拡張子なし）から分類
fn classify_name(stem: &str) -> Option<DetectedObject> {
    let normalized = stem
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    // 語単位の一致を優先し、同順位なら長いキーワードを採る
    let padded = format!(" {} ", normalized);
    let whole_token = MARKETPLACE_KEYWORDS
        .iter()
        .filter(|k| padded.contains(&format!(" {} ", k)))
        .max_by_key(|k| k.len());
    let keyword = whole_token.or_else(|| {
        MARKETPLACE_KEYWORDS
            .iter()
            .filter(|k| normalized.contains(*k))
            .max_by_key(|k| k.len())
    });
    if let Some(keyword) = keyword {
        return Some(DetectedObject::new(*keyword, KEYWORD_CONFIDENCE));
    }

    normalized
        .split(' ')
        .find(|t| t.len() >= 3 && t.chars().all(char::is_alphabetic) && !NOISE_TOKENS.contains(t))
        .map(|t| DetectedObject::new(t, GUESS_CONFIDENCE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::ObjectDetector;

    #[test]
    fn test_classify_keyword() {
        let detected = classify_name("img_2041_laptop").unwrap();
        assert_eq!(detected.object_class, "laptop");
        assert_eq!(detected.confidence, KEYWORD_CONFIDENCE);
    }

    #[test]
    fn test_classify_multi_word_keyword() {
        let detected = classify_name("retro-game_console-01").unwrap();
        assert_eq!(detected.object_class, "game console");
    }

    #[test]
    fn test_classify_prefers_whole_token() {
        let detected = classify_name("sony_headphones").unwrap();
        assert_eq!(detected.object_class, "headphones");

        let detected = classify_name("red_phone_case").unwrap();
        assert_eq!(detected.object_class, "phone");

        // 語の一部でも長い方を採る
        let detected = classify_name("myheadphones2").unwrap();
        assert_eq!(detected.object_class, "headphones");
    }

    #[test]
    fn test_classify_guess() {
        let detected = classify_name("dsc_0042_skateboard").unwrap();
        assert_eq!(detected.object_class, "skateboard");
        assert_eq!(detected.confidence, GUESS_CONFIDENCE);
    }

    #[test]
    fn test_classify_nothing() {
        assert!(classify_name("img_2041").is_none());
        assert!(classify_name("").is_none());
    }

    #[tokio::test]
    async fn test_detect_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oak_chair.jpg");
        std::fs::write(&path, b"dummy").unwrap();

        let detector = ObjectDetector::new(KeywordDetector);
        let detected = detector
            .detect(&CapturedImage::camera(path.display().to_string()))
            .await;
        assert_eq!(detected.object_class, "chair");
    }

    #[tokio::test]
    async fn test_detect_missing_file_is_unknown() {
        let detector = ObjectDetector::new(KeywordDetector);
        let detected = detector
            .detect(&CapturedImage::camera("/nonexistent/laptop.jpg"))
            .await;
        assert_eq!(detected, DetectedObject::unknown());
    }
}
