//! 画像の取得
//!
//! capture() で得た画像は必ず Camera、pick_from_library() で得た画像は
//! 枚数によらず Gallery として記録する。キャンセルはエラーではなく空の結果。

mod files;

pub use files::{FileCamera, FolderLibrary};

use crate::error::Result;
use async_trait::async_trait;
use listing_ai_common::CapturedImage;

pub(crate) const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "webp"];

#[async_trait]
pub trait ImageCapture: Send + Sync {
    /// 1枚撮影。キャンセル時は None
    async fn capture(&self) -> Result<Option<CapturedImage>>;

    /// ライブラリから選択。キャンセル時は空
    async fn pick_from_library(&self, allow_multiple: bool) -> Result<Vec<CapturedImage>>;
}

/// 撮影を繰り返し、キャンセルされるか上限に達するまで画像を集める
pub async fn capture_many(capture: &dyn ImageCapture, limit: usize) -> Result<Vec<CapturedImage>> {
    let mut images = Vec::new();
    while images.len() < limit {
        match capture.capture().await? {
            Some(image) => images.push(image),
            None => break,
        }
    }
    Ok(images)
}

pub(crate) fn is_image_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_extension() {
        assert!(is_image_extension("jpg"));
        assert!(is_image_extension("JPG"));
        assert!(is_image_extension("jpeg"));
        assert!(is_image_extension("png"));
        assert!(is_image_extension("HEIC"));
        assert!(!is_image_extension("txt"));
        assert!(!is_image_extension("pdf"));
        assert!(!is_image_extension("gif"));
    }
}
