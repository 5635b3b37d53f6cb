//! プロンプト生成モジュール
//!
//! - LISTING_CATEGORIES: AIに提示するカテゴリ
//! - SYSTEM_PROMPT_SINGLE / SYSTEM_PROMPT_MULTI: システム指示
//! - build_listing_prompt: 画像枚数に応じたユーザープロンプト

/// 出品カテゴリ
pub const LISTING_CATEGORIES: &[&str] = &[
    "Electronics",
    "Furniture",
    "Clothing",
    "Home & Garden",
    "Toys & Games",
    "Sports",
    "Books",
    "Automotive",
    "Other",
];

pub const SYSTEM_PROMPT_SINGLE: &str = "You are an expert at analyzing product images and creating compelling marketplace listings. Provide detailed, accurate, and SEO-friendly descriptions.";

pub const SYSTEM_PROMPT_MULTI: &str = "You are an expert at analyzing product images and creating compelling marketplace listings. Analyze all provided images to create the most accurate and detailed listing.";

const OUTPUT_FORMAT: &str = r#"Format your response as JSON:
{
  "title": "...",
  "description": "...",
  "suggestedPrice": 0,
  "category": "...",
  "condition": "...",
  "tags": ["tag1", "tag2", ...]
}"#;

/// 画像枚数に応じたシステム指示
pub fn system_prompt(image_count: usize) -> &'static str {
    if image_count > 1 {
        SYSTEM_PROMPT_MULTI
    } else {
        SYSTEM_PROMPT_SINGLE
    }
}

/// 出品情報生成用プロンプト
///
/// # Arguments
/// * `image_count` - リクエストに添付する画像の枚数
/// * `currency` - 価格の通貨コード（例: "AUD"）
pub fn build_listing_prompt(image_count: usize, currency: &str) -> String {
    let categories = LISTING_CATEGORIES.join(", ");

    if image_count > 1 {
        format!(
            r#"Analyze these {image_count} product images and provide:
1. A catchy, SEO-friendly title that captures the main product (max 80 characters)
2. A comprehensive description highlighting all visible features, condition, and benefits. Mention details from all images. (200-400 words)
3. Estimated fair market price in {currency} based on condition and features
4. Most appropriate category from: {categories}
5. Overall condition assessment: new, like-new, good, fair, or poor
6. Relevant tags/keywords (7-15 tags)

{OUTPUT_FORMAT}"#
        )
    } else {
        format!(
            r#"Analyze this product image and provide:
1. A catchy, SEO-friendly title (max 80 characters)
2. A detailed description highlighting key features, condition, and benefits (150-300 words)
3. Estimated fair market price in {currency} based on condition and features
4. Most appropriate category from: {categories}
5. Condition assessment: new, like-new, good, fair, or poor
6. Relevant tags/keywords (5-10 tags)

{OUTPUT_FORMAT}"#
        )
    }
}
