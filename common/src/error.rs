//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No images: a listing needs at least one photo")]
    NoImages,

    #[error("Watermark not allowed: {0} is not a camera photo")]
    WatermarkNotAllowed(String),

    #[error("Image set mismatch: {0}")]
    ImageMismatch(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_parse() {
        let error = Error::Parse("JSONが見つかりません".to_string());
        assert_eq!(format!("{}", error), "Parse error: JSONが見つかりません");
    }

    #[test]
    fn test_error_display_no_images() {
        assert!(Error::NoImages.to_string().contains("at least one photo"));
    }

    #[test]
    fn test_error_display_watermark_not_allowed() {
        let error = Error::WatermarkNotAllowed("gallery/cat.jpg".to_string());
        let display = format!("{}", error);
        assert!(display.contains("gallery/cat.jpg"));
        assert!(display.contains("camera"));
    }
}
