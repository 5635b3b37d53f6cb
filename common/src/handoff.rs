//! 受け渡し記録とテキスト整形
//!
//! HandoffRecord はコピー/保存済みの項目集合（最大4項目）で、
//! 進捗表示の割合計算にのみ使う。

use crate::draft::{format_price, DraftField, ListingDraft};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// 受け渡し記録の項目
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandoffField {
    Title,
    Price,
    Description,
    Photo,
}

impl HandoffField {
    pub const ALL: [HandoffField; 4] = [
        HandoffField::Title,
        HandoffField::Price,
        HandoffField::Description,
        HandoffField::Photo,
    ];

    /// 下書きフィールドに対応する項目（category/condition は記録対象外）
    pub fn from_draft_field(field: DraftField) -> Option<HandoffField> {
        match field {
            DraftField::Title => Some(HandoffField::Title),
            DraftField::Price => Some(HandoffField::Price),
            DraftField::Description => Some(HandoffField::Description),
            DraftField::Category | DraftField::Condition => None,
        }
    }
}

impl fmt::Display for HandoffField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HandoffField::Title => "title",
            HandoffField::Price => "price",
            HandoffField::Description => "description",
            HandoffField::Photo => "photo",
        };
        write!(f, "{}", name)
    }
}

/// コピー/保存済み項目の集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HandoffRecord {
    fields: BTreeSet<HandoffField>,
}

impl HandoffRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: HandoffField) {
        self.fields.insert(field);
    }

    pub fn mark_all(&mut self) {
        self.fields.extend(HandoffField::ALL);
    }

    pub fn contains(&self, field: HandoffField) -> bool {
        self.fields.contains(&field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 進捗率（0〜100、四捨五入）
    pub fn completion_percentage(&self) -> u8 {
        let total = HandoffField::ALL.len() as f64;
        ((self.fields.len() as f64 / total) * 100.0).round() as u8
    }
}

/// コピー後の通知文
pub fn copy_notice(field: DraftField) -> &'static str {
    match field {
        DraftField::Title => "📋 Title copied! Paste it in the marketplace title field",
        DraftField::Price => "💰 Price copied! Paste it in the marketplace price field",
        DraftField::Description => {
            "📝 Description copied! Paste it in the marketplace description field"
        }
        _ => "Copied!",
    }
}

pub const PHOTO_SAVED_NOTICE: &str = "📸 Photo saved to gallery!";

/// 一括コピー用テキスト（タイトル・価格・説明を改行で連結）
pub fn compose_post_text(draft: &ListingDraft, currency_symbol: &str) -> String {
    format!(
        "Title: {}\nPrice: {}{}\nDescription: {}",
        draft.title(),
        currency_symbol,
        format_price(draft.price()),
        draft.description()
    )
}

/// 共有シート用テキスト
pub fn shareable_text(draft: &ListingDraft, currency_symbol: &str) -> String {
    format!(
        "📱 {}\n\n{}\n\n💰 Price: {}{}\n📦 Condition: {}\n🏷️ Category: {}\n\n#ForSale #Marketplace",
        draft.title(),
        draft.description(),
        currency_symbol,
        format_price(draft.price()),
        draft.condition().label(),
        draft.category()
    )
}

/// 下書き保存用の詳細テキスト
pub fn detailed_text(draft: &ListingDraft, currency_symbol: &str) -> String {
    let mut text = String::from("=== LISTING DETAILS ===\n\n");
    text.push_str(&format!("TITLE:\n{}\n\n", draft.title()));
    text.push_str(&format!("DESCRIPTION:\n{}\n\n", draft.description()));
    text.push_str(&format!(
        "PRICE: {}{}\n",
        currency_symbol,
        format_price(draft.price())
    ));
    text.push_str(&format!("CONDITION: {}\n", draft.condition().label()));
    text.push_str(&format!("CATEGORY: {}\n\n", draft.category()));

    if let Some(detected) = draft.source_detection() {
        text.push_str(&format!("Detected Item: {}\n", detected.object_class));
        text.push_str(&format!(
            "Confidence: {}%\n\n",
            detected.confidence_percent()
        ));
    }

    text.push_str("Don't forget to upload your photo!\n");
    text.push_str("\n#SellEasy #Marketplace #ForSale");
    text
}
