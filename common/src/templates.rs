//! 定型文による出品情報生成（オフライン・決定的）
//!
//! 検出クラス名（大文字小文字を区別しない）で定型文を引き、
//! 該当がなければクラス名から汎用の定型文を組み立てる。
//! 価格は pricing::suggest_price_for で独立に算出する。

use crate::pricing::suggest_price_for;
use crate::types::{Condition, GeneratedContent};

struct ListingTemplate {
    class: &'static str,
    title: &'static str,
    description: &'static str,
    category: &'static str,
    condition: Condition,
    tags: &'static [&'static str],
}

const TEMPLATES: &[ListingTemplate] = &[
    ListingTemplate {
        class: "laptop",
        title: "High-Performance Laptop - Great Condition",
        description: "Selling my reliable laptop in excellent working condition. Perfect for students or professionals. Comes with charger. No scratches on screen. Battery holds charge well. Smoke-free home.",
        category: "Electronics",
        condition: Condition::Good,
        tags: &["laptop", "computer", "electronics", "work from home"],
    },
    ListingTemplate {
        class: "phone",
        title: "Smartphone - Unlocked and Ready to Use",
        description: "Well-maintained smartphone, unlocked and works with all carriers. Screen protector installed. Minimal wear. Includes original charger. Great for calls, texts, and apps.",
        category: "Electronics",
        condition: Condition::Good,
        tags: &["phone", "smartphone", "mobile", "unlocked"],
    },
    ListingTemplate {
        class: "book",
        title: "Book in Great Condition",
        description: "Gently used book from smoke-free home. Pages are clean with no writing or highlighting. Perfect for reading or collecting.",
        category: "Books & Media",
        condition: Condition::LikeNew,
        tags: &["book", "reading", "literature"],
    },
    ListingTemplate {
        class: "chair",
        title: "Comfortable Chair - Home/Office Use",
        description: "Sturdy and comfortable chair suitable for dining room, office, or bedroom. Clean and well-maintained. No rips or stains.",
        category: "Furniture",
        condition: Condition::Good,
        tags: &["chair", "furniture", "seating", "home"],
    },
];

/// 定型文から出品情報を生成
pub fn template_content(object_class: &str) -> GeneratedContent {
    let key = object_class.trim().to_lowercase();

    let mut content = match TEMPLATES.iter().find(|t| t.class == key) {
        Some(t) => GeneratedContent {
            title: t.title.to_string(),
            description: t.description.to_string(),
            suggested_price: 0.0,
            category: t.category.to_string(),
            condition: t.condition,
            tags: t.tags.iter().map(|s| s.to_string()).collect(),
        },
        None => generic_content(object_class.trim()),
    };

    content.suggested_price = suggest_price_for(&key, content.condition) as f64;
    content
}

fn generic_content(object_class: &str) -> GeneratedContent {
    GeneratedContent {
        title: format!("{} for Sale", capitalize_first(object_class)),
        description: format!(
            "Quality {} in good condition. Well-maintained and ready for a new home. Priced to sell quickly. Pick up only. Cash preferred.",
            object_class
        ),
        suggested_price: 0.0,
        category: "General".to_string(),
        condition: Condition::Good,
        tags: vec![object_class.to_lowercase(), "for sale".to_string()],
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_exact_match_case_insensitive() {
        let content = template_content("LAPTOP");
        assert_eq!(content.title, "High-Performance Laptop - Great Condition");
        assert_eq!(content.category, "Electronics");
        assert_eq!(content.condition, Condition::Good);
        assert_eq!(content.suggested_price, 260.0);
        assert!(content.tags.contains(&"computer".to_string()));
    }

    #[test]
    fn test_template_book_uses_like_new_price() {
        let content = template_content("book");
        assert_eq!(content.condition, Condition::LikeNew);
        assert_eq!(content.suggested_price, 9.0); // 10 × 0.85 = 8.5 → 9
    }

    #[test]
    fn test_template_generic_fallback() {
        let content = template_content("skateboard");
        assert_eq!(content.title, "Skateboard for Sale");
        assert_eq!(content.category, "General");
        assert_eq!(content.condition, Condition::Good);
        assert_eq!(content.suggested_price, 16.0); // 25 × 0.65
        assert_eq!(content.tags, vec!["skateboard".to_string(), "for sale".to_string()]);
        assert!(content.description.contains("Quality skateboard"));
    }

    #[test]
    fn test_template_generic_fallback_uses_known_base_price() {
        // 定型文はないが基準価格はあるクラス
        let content = template_content("camera");
        assert_eq!(content.title, "Camera for Sale");
        assert_eq!(content.suggested_price, 195.0); // 300 × 0.65
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("watch"), "Watch");
        assert_eq!(capitalize_first(""), "");
    }
}
