//! 価格提案
//!
//! 基準価格（物体クラス別）× 状態係数 を四捨五入して整数の通貨単位で返す。

use crate::types::Condition;

/// 未知のクラスの基準価格
pub const DEFAULT_BASE_PRICE: f64 = 25.0;

/// 未知の状態の係数（"good" と同じ）
pub const DEFAULT_CONDITION_MULTIPLIER: f64 = 0.65;

const BASE_PRICES: &[(&str, f64)] = &[
    ("laptop", 400.0),
    ("phone", 200.0),
    ("tablet", 150.0),
    ("book", 10.0),
    ("chair", 50.0),
    ("table", 100.0),
    ("television", 250.0),
    ("camera", 300.0),
    ("watch", 100.0),
    ("bicycle", 150.0),
    ("shoe", 40.0),
    ("shoes", 40.0),
    ("backpack", 30.0),
];

/// クラス名の基準価格（大文字小文字を区別しない完全一致）
pub fn base_price(object_class: &str) -> f64 {
    let key = object_class.trim().to_lowercase();
    BASE_PRICES
        .iter()
        .find(|(class, _)| *class == key)
        .map(|(_, price)| *price)
        .unwrap_or(DEFAULT_BASE_PRICE)
}

pub fn condition_multiplier(condition: Condition) -> f64 {
    match condition {
        Condition::New => 1.0,
        Condition::LikeNew => 0.85,
        Condition::Good => 0.65,
        Condition::Fair => 0.45,
        Condition::Poor => 0.25,
    }
}

/// 文字列の状態から価格を提案
///
/// # Examples
/// ```
/// use listing_ai_common::suggest_price;
///
/// assert_eq!(suggest_price("laptop", "good"), 260);
/// assert_eq!(suggest_price("unknownthing", "new"), 25);
/// ```
pub fn suggest_price(object_class: &str, condition: &str) -> u32 {
    let multiplier = condition
        .parse::<Condition>()
        .map(condition_multiplier)
        .unwrap_or(DEFAULT_CONDITION_MULTIPLIER);
    round_price(base_price(object_class) * multiplier)
}

pub fn suggest_price_for(object_class: &str, condition: Condition) -> u32 {
    round_price(base_price(object_class) * condition_multiplier(condition))
}

fn round_price(value: f64) -> u32 {
    value.round().max(0.0) as u32
}
