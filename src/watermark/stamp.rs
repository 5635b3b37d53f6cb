//! image クレートによる透かし付与（縮小・バッジ描画・JPEG再圧縮）

use super::{WatermarkPrimitive, WATERMARK_PREFIX};
use crate::config::Config;
use anyhow::Context;
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// バッジ色 rgba(34, 197, 94, 0.9)
const BADGE_COLOR: [u8; 3] = [34, 197, 94];
const BADGE_ALPHA: f32 = 0.9;

pub struct ImageWatermarker {
    output_dir: PathBuf,
    max_width: u32,
    quality: u8,
    counter: AtomicUsize,
}

impl ImageWatermarker {
    pub fn new(output_dir: impl Into<PathBuf>, max_width: u32, quality: u8) -> Self {
        Self {
            output_dir: output_dir.into(),
            max_width: max_width.max(1),
            quality: quality.clamp(1, 100),
            counter: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &Config) -> crate::error::Result<Self> {
        Ok(Self::new(
            Config::cache_dir()?,
            config.watermark_width,
            config.watermark_quality,
        ))
    }

    /// watermarked_<ミリ秒>_<連番>.jpg
    fn next_output_path(&self) -> PathBuf {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let millis = chrono::Utc::now().timestamp_millis();
        self.output_dir
            .join(format!("{}{}_{}.jpg", WATERMARK_PREFIX, millis, n))
    }
}

#[async_trait]
impl WatermarkPrimitive for ImageWatermarker {
    async fn stamp(&self, source_uri: &str) -> anyhow::Result<String> {
        let source = PathBuf::from(source_uri);
        let dest = self.next_output_path();
        let max_width = self.max_width;
        let quality = self.quality;

        let written = tokio::task::spawn_blocking(move || {
            render(&source, &dest, max_width, quality).map(|_| dest)
        })
        .await??;

        Ok(written.display().to_string())
    }
}

fn render(source: &Path, dest: &Path, max_width: u32, quality: u8) -> anyhow::Result<()> {
    let img = image::open(source)
        .with_context(|| format!("画像を開けません: {}", source.display()))?;

    let img = if img.width() > max_width {
        img.resize(max_width, u32::MAX, FilterType::Lanczos3)
    } else {
        img
    };

    let mut rgb = img.to_rgb8();
    draw_badge(&mut rgb);

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    encode_jpeg(&rgb, dest, quality)
}

/// JPEGで書き出す。失敗時は書きかけのファイルを残さない
fn encode_jpeg(rgb: &RgbImage, dest: &Path, quality: u8) -> anyhow::Result<()> {
    let result = write_jpeg(rgb, dest, quality);
    if result.is_err() {
        let _ = std::fs::remove_file(dest);
    }
    result
}

fn write_jpeg(rgb: &RgbImage, dest: &Path, quality: u8) -> anyhow::Result<()> {
    let file = File::create(dest)
        .with_context(|| format!("出力ファイルを作成できません: {}", dest.display()))?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, quality).write_image(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ExtendedColorType::Rgb8,
    )?;
    writer.flush()?;
    Ok(())
}

/// 右下に半透明のバッジを描く
fn draw_badge(img: &mut RgbImage) {
    let (width, height) = img.dimensions();
    let margin = (width / 60).max(1);
    let badge_w = (width / 4).max(1).min(width);
    let badge_h = (height / 14).max(1).min(height);

    let x0 = width.saturating_sub(badge_w + margin);
    let y0 = height.saturating_sub(badge_h + margin);
    let x1 = (x0 + badge_w).min(width);
    let y1 = (y0 + badge_h).min(height);

    for y in y0..y1 {
        for x in x0..x1 {
            let Rgb(base) = *img.get_pixel(x, y);
            let mut blended = [0u8; 3];
            for c in 0..3 {
                let mixed = BADGE_COLOR[c] as f32 * BADGE_ALPHA + base[c] as f32 * (1.0 - BADGE_ALPHA);
                blended[c] = mixed.round() as u8;
            }
            img.put_pixel(x, y, Rgb(blended));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        img.save(path).unwrap();
    }

    #[test]
    fn test_draw_badge_bottom_right() {
        let mut img = RgbImage::from_pixel(120, 140, Rgb([0, 0, 0]));
        draw_badge(&mut img);

        let Rgb(corner) = *img.get_pixel(115, 135);
        assert_eq!(corner, [31, 177, 85]);
        assert_eq!(*img.get_pixel(0, 0), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_draw_badge_tiny_image() {
        let mut img = RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]));
        draw_badge(&mut img);
        assert_eq!(img.dimensions(), (1, 1));
    }

    #[tokio::test]
    async fn test_stamp_resizes_and_names_output() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("item.png");
        write_fixture(&source, 300, 150);

        let watermarker = ImageWatermarker::new(dir.path().join("out"), 100, 90);
        let uri = watermarker.stamp(&source.display().to_string()).await.unwrap();

        assert!(crate::watermark::has_watermark(&uri));
        assert!(uri.ends_with("_0.jpg"));
        let output = image::open(&uri).unwrap();
        assert_eq!(output.width(), 100);
        assert_eq!(output.height(), 50);
    }

    #[test]
    fn test_encode_failure_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("watermarked_1_0.jpg");

        // JPEGの上限(65535px)を超える幅
        let too_wide = RgbImage::new(65_536, 1);
        assert!(encode_jpeg(&too_wide, &dest, 90).is_err());
        assert!(!dest.exists());

        let ok = RgbImage::new(4, 4);
        encode_jpeg(&ok, &dest, 90).unwrap();
        assert!(dest.exists());
    }

    #[tokio::test]
    async fn test_stamp_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let watermarker = ImageWatermarker::new(dir.path(), 1200, 90);
        assert!(watermarker.stamp("/nonexistent/a.jpg").await.is_err());
    }
}
