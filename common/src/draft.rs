//! 出品下書き（編集対象）
//!
//! 生成結果を初期値とし、利用者が各フィールドを個別に編集する。
//! セッション内でのみ保持され、再起動をまたいで永続化しない。

use crate::error::{Error, Result};
use crate::parser::truncate_chars;
use crate::types::{CapturedImage, Condition, DetectedObject, GeneratedContent};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// 編集可能なフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Title,
    Description,
    Price,
    Category,
    Condition,
}

impl DraftField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftField::Title => "title",
            DraftField::Description => "description",
            DraftField::Price => "price",
            DraftField::Category => "category",
            DraftField::Condition => "condition",
        }
    }
}

impl FromStr for DraftField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(DraftField::Title),
            "description" | "desc" => Ok(DraftField::Description),
            "price" => Ok(DraftField::Price),
            "category" => Ok(DraftField::Category),
            "condition" => Ok(DraftField::Condition),
            _ => Err(format!(
                "Unknown field: {}. Use title, description, price, category, or condition",
                s
            )),
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// updateField の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate {
    /// 入力どおりに反映
    Accepted,
    /// 文字数超過の切り詰め、または価格の 0 への補正を行って反映
    Adjusted,
}

/// 検証エラーの理由
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidField {
    #[error("title: タイトルを入力してください")]
    Title,
    #[error("description: 説明を入力してください")]
    Description,
    #[error("price: 正しい価格を入力してください")]
    Price,
}

impl InvalidField {
    pub fn reason(&self) -> &'static str {
        match self {
            InvalidField::Title => "title",
            InvalidField::Description => "description",
            InvalidField::Price => "price",
        }
    }
}

pub type ValidationResult = std::result::Result<(), InvalidField>;

/// 出品下書き
///
/// 読み込み時も画像0枚は拒否し、文字数上限と価格の補正を掛け直す。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ListingDraftRecord")]
pub struct ListingDraft {
    images: Vec<CapturedImage>,
    title: String,
    description: String,
    price: f64,
    category: String,
    condition: Condition,
    suggested_price: f64,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_detection: Option<DetectedObject>,
}

/// 読み込み用の検証前の形
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingDraftRecord {
    images: Vec<CapturedImage>,
    title: String,
    description: String,
    price: f64,
    category: String,
    condition: Condition,
    suggested_price: f64,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    source_detection: Option<DetectedObject>,
}

impl TryFrom<ListingDraftRecord> for ListingDraft {
    type Error = Error;

    fn try_from(record: ListingDraftRecord) -> Result<Self> {
        if record.images.is_empty() {
            return Err(Error::NoImages);
        }

        Ok(Self {
            images: record.images,
            title: truncate_chars(&record.title, TITLE_MAX_CHARS),
            description: truncate_chars(&record.description, DESCRIPTION_MAX_CHARS),
            price: sanitize_price(record.price),
            category: record.category,
            condition: record.condition,
            suggested_price: sanitize_price(record.suggested_price),
            tags: record.tags,
            source_detection: record.source_detection,
        })
    }
}

impl ListingDraft {
    /// 生成結果から下書きを作成
    ///
    /// 画像が0枚の場合は Error::NoImages
    pub fn from_generated(
        images: Vec<CapturedImage>,
        content: GeneratedContent,
        source_detection: Option<DetectedObject>,
    ) -> Result<Self> {
        if images.is_empty() {
            return Err(Error::NoImages);
        }

        let price = sanitize_price(content.suggested_price);
        Ok(Self {
            images,
            title: truncate_chars(&content.title, TITLE_MAX_CHARS),
            description: truncate_chars(&content.description, DESCRIPTION_MAX_CHARS),
            price,
            category: content.category,
            condition: content.condition,
            suggested_price: price,
            tags: content.tags,
            source_detection,
        })
    }

    pub fn images(&self) -> &[CapturedImage] {
        &self.images
    }

    /// 先頭の画像（代表画像）
    pub fn primary_image(&self) -> Option<&CapturedImage> {
        self.images.first()
    }

    pub fn camera_images(&self) -> impl Iterator<Item = &CapturedImage> {
        self.images.iter().filter(|img| img.is_from_camera())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn suggested_price(&self) -> f64 {
        self.suggested_price
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn source_detection(&self) -> Option<&DetectedObject> {
        self.source_detection.as_ref()
    }

    /// 提案価格との差額
    pub fn price_delta(&self) -> f64 {
        self.price - self.suggested_price
    }

    /// 文字数カウンタ表示用（現在の文字数, 上限）
    pub fn char_count(&self, field: DraftField) -> Option<(usize, usize)> {
        match field {
            DraftField::Title => Some((self.title.chars().count(), TITLE_MAX_CHARS)),
            DraftField::Description => {
                Some((self.description.chars().count(), DESCRIPTION_MAX_CHARS))
            }
            _ => None,
        }
    }

    /// フィールドを1つだけ更新
    ///
    /// - title / description: 上限を超える分は切り詰める
    /// - price: 数値として解釈できない、または負の値は 0
    /// - condition: 不明な値は Good
    pub fn update_field(&mut self, field: DraftField, value: &str) -> FieldUpdate {
        match field {
            DraftField::Title => set_limited(&mut self.title, value, TITLE_MAX_CHARS),
            DraftField::Description => {
                set_limited(&mut self.description, value, DESCRIPTION_MAX_CHARS)
            }
            DraftField::Price => {
                let parsed = value.trim().trim_start_matches('$').parse::<f64>().ok();
                self.price = parsed.map(sanitize_price).unwrap_or(0.0);
                match parsed {
                    Some(p) if p.is_finite() && p >= 0.0 => FieldUpdate::Accepted,
                    _ => FieldUpdate::Adjusted,
                }
            }
            DraftField::Category => {
                self.category = value.to_string();
                FieldUpdate::Accepted
            }
            DraftField::Condition => match value.parse::<Condition>() {
                Ok(condition) => {
                    self.condition = condition;
                    FieldUpdate::Accepted
                }
                Err(_) => {
                    self.condition = Condition::default();
                    FieldUpdate::Adjusted
                }
            },
        }
    }

    /// 表示・コピー用のフィールド値
    pub fn field_value(&self, field: DraftField) -> String {
        match field {
            DraftField::Title => self.title.clone(),
            DraftField::Description => self.description.clone(),
            DraftField::Price => format_price(self.price),
            DraftField::Category => self.category.clone(),
            DraftField::Condition => self.condition.label().to_string(),
        }
    }

    /// 受け渡し前の検証（最初の違反を返す）
    pub fn validate(&self) -> ValidationResult {
        match self.violations().first() {
            Some(field) => Err(*field),
            None => Ok(()),
        }
    }

    /// すべての違反（フィールド単位のメッセージ表示用）
    pub fn violations(&self) -> Vec<InvalidField> {
        let mut violations = Vec::new();
        if self.title.trim().is_empty() {
            violations.push(InvalidField::Title);
        }
        if self.description.trim().is_empty() {
            violations.push(InvalidField::Description);
        }
        if !(self.price.is_finite() && self.price > 0.0) {
            violations.push(InvalidField::Price);
        }
        violations
    }

    /// 画像を1枚削除（内容の再生成は行わない）
    ///
    /// 最後の1枚は削除できない
    pub fn remove_image(&mut self, index: usize) -> Result<CapturedImage> {
        if index >= self.images.len() {
            return Err(Error::ImageMismatch(format!(
                "index {} is out of range ({} images)",
                index,
                self.images.len()
            )));
        }
        if self.images.len() == 1 {
            return Err(Error::NoImages);
        }
        Ok(self.images.remove(index))
    }

    /// 透かし処理後の画像列で置き換える
    ///
    /// 枚数・順序・取得元が一致しない場合はエラー
    pub fn replace_images(&mut self, images: Vec<CapturedImage>) -> Result<()> {
        if images.len() != self.images.len() {
            return Err(Error::ImageMismatch(format!(
                "expected {} images, got {}",
                self.images.len(),
                images.len()
            )));
        }
        let consistent = self.images.iter().zip(&images).all(|(old, new)| {
            old.source_uri() == new.source_uri() && old.origin() == new.origin()
        });
        if !consistent {
            return Err(Error::ImageMismatch("image order or origin changed".into()));
        }
        self.images = images;
        Ok(())
    }
}

fn set_limited(target: &mut String, value: &str, max_chars: usize) -> FieldUpdate {
    if value.chars().count() > max_chars {
        *target = truncate_chars(value, max_chars);
        FieldUpdate::Adjusted
    } else {
        *target = value.to_string();
        FieldUpdate::Accepted
    }
}

fn sanitize_price(price: f64) -> f64 {
    if price.is_finite() && price > 0.0 {
        price
    } else {
        0.0
    }
}

/// 価格表示（整数なら小数点なし、それ以外は小数2桁）
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{}", price as i64)
    } else {
        format!("{:.2}", price)
    }
}
