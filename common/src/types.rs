//! 出品データの型定義
//!
//! CLIとライブラリで共有される型:
//! - CapturedImage: 撮影/選択された画像と透かし状態
//! - DetectedObject: 物体検出の結果
//! - Condition: 商品状態（5段階）
//! - GeneratedContent: 生成された出品情報

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 画像の取得元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOrigin {
    /// カメラで直接撮影
    Camera,
    /// ライブラリから選択
    Gallery,
}

impl fmt::Display for ImageOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageOrigin::Camera => write!(f, "camera"),
            ImageOrigin::Gallery => write!(f, "gallery"),
        }
    }
}

/// 透かしの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WatermarkState {
    #[default]
    NotWatermarked,
    Watermarked,
}

/// 撮影/選択された画像
///
/// 取得元は生成後に変更できない。ライブラリ画像は透かし済みにならない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "CapturedImageRecord")]
pub struct CapturedImage {
    source_uri: String,
    origin: ImageOrigin,
    watermark_state: WatermarkState,
    #[serde(skip_serializing_if = "Option::is_none")]
    watermarked_uri: Option<String>,
    captured_at: DateTime<Utc>,
}

impl CapturedImage {
    pub fn new(source_uri: impl Into<String>, origin: ImageOrigin) -> Self {
        Self {
            source_uri: source_uri.into(),
            origin,
            watermark_state: WatermarkState::NotWatermarked,
            watermarked_uri: None,
            captured_at: Utc::now(),
        }
    }

    pub fn camera(source_uri: impl Into<String>) -> Self {
        Self::new(source_uri, ImageOrigin::Camera)
    }

    pub fn gallery(source_uri: impl Into<String>) -> Self {
        Self::new(source_uri, ImageOrigin::Gallery)
    }

    pub fn with_captured_at(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = captured_at;
        self
    }

    pub fn source_uri(&self) -> &str {
        &self.source_uri
    }

    pub fn origin(&self) -> ImageOrigin {
        self.origin
    }

    pub fn watermark_state(&self) -> WatermarkState {
        self.watermark_state
    }

    pub fn watermarked_uri(&self) -> Option<&str> {
        self.watermarked_uri.as_deref()
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn is_from_camera(&self) -> bool {
        self.origin == ImageOrigin::Camera
    }

    pub fn is_watermarked(&self) -> bool {
        self.watermark_state == WatermarkState::Watermarked
    }

    /// 透かし済みのコピーを返す
    ///
    /// カメラ画像以外、または空のURIはエラー
    pub fn watermarked(&self, watermarked_uri: impl Into<String>) -> Result<Self> {
        if !self.is_from_camera() {
            return Err(Error::WatermarkNotAllowed(self.source_uri.clone()));
        }
        let watermarked_uri = watermarked_uri.into();
        if watermarked_uri.trim().is_empty() {
            return Err(Error::Parse("透かし画像のURIが空です".into()));
        }
        Ok(Self {
            watermark_state: WatermarkState::Watermarked,
            watermarked_uri: Some(watermarked_uri),
            ..self.clone()
        })
    }

    /// 保存・共有に使うURI（透かし済みがあればそちらを優先）
    pub fn preferred_uri(&self) -> &str {
        self.watermarked_uri.as_deref().unwrap_or(&self.source_uri)
    }
}

/// デシリアライズ用の中間表現（不変条件を検証してから CapturedImage へ変換）
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CapturedImageRecord {
    source_uri: String,
    origin: ImageOrigin,
    #[serde(default)]
    watermark_state: WatermarkState,
    #[serde(default)]
    watermarked_uri: Option<String>,
    captured_at: DateTime<Utc>,
}

impl TryFrom<CapturedImageRecord> for CapturedImage {
    type Error = String;

    fn try_from(record: CapturedImageRecord) -> std::result::Result<Self, Self::Error> {
        let watermarked = record.watermark_state == WatermarkState::Watermarked;
        if watermarked && record.origin == ImageOrigin::Gallery {
            return Err(format!(
                "gallery image {} cannot be watermarked",
                record.source_uri
            ));
        }
        if watermarked != record.watermarked_uri.is_some() {
            return Err(format!(
                "watermarkState and watermarkedUri disagree for {}",
                record.source_uri
            ));
        }
        Ok(Self {
            source_uri: record.source_uri,
            origin: record.origin,
            watermark_state: record.watermark_state,
            watermarked_uri: record.watermarked_uri,
            captured_at: record.captured_at,
        })
    }
}

/// 物体検出の結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedObject {
    pub object_class: String,
    /// 0.0〜1.0
    pub confidence: f64,
}

impl DetectedObject {
    pub const UNKNOWN_CLASS: &'static str = "unknown";

    pub fn new(object_class: impl Into<String>, confidence: f64) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            object_class: object_class.into(),
            confidence,
        }
    }

    /// 検出失敗時の番兵値
    pub fn unknown() -> Self {
        Self::new(Self::UNKNOWN_CLASS, 0.0)
    }

    /// confidence = 0 は「有効な信号なし」
    pub fn has_signal(&self) -> bool {
        self.confidence > 0.0
    }

    pub fn confidence_percent(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

/// 商品状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    New,
    LikeNew,
    #[default]
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::New,
        Condition::LikeNew,
        Condition::Good,
        Condition::Fair,
        Condition::Poor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::LikeNew => "like-new",
            Condition::Good => "good",
            Condition::Fair => "fair",
            Condition::Poor => "poor",
        }
    }

    /// 表示用ラベル（"like-new" → "Like New"）
    pub fn label(&self) -> &'static str {
        match self {
            Condition::New => "New",
            Condition::LikeNew => "Like New",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        }
    }

    /// 大文字小文字・区切り文字を無視して解釈し、不明な値は Good とする
    pub fn normalize(value: &str) -> Condition {
        value.parse().unwrap_or_default()
    }
}

impl FromStr for Condition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '_' { '-' } else { c })
            .collect();
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| Error::Parse(format!("Unknown condition: {}", s)))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 生成された出品情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedContent {
    pub title: String,
    pub description: String,
    pub suggested_price: f64,
    pub category: String,
    pub condition: Condition,
    pub tags: Vec<String>,
}
