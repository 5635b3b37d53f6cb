//! APIレスポンスパーサー
//!
//! AIの自由文レスポンスから最初の整形式JSONオブジェクトを取り出し、
//! 各フィールドを個別に既定値で補って GeneratedContent に変換する。

use crate::draft::{DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};
use crate::error::{Error, Result};
use crate::types::{Condition, GeneratedContent};
use serde_json::{Map, Value};

pub const DEFAULT_TITLE: &str = "Product for Sale";
pub const DEFAULT_DESCRIPTION: &str = "Quality item in good condition";
pub const DEFAULT_CATEGORY: &str = "Other";

/// レスポンスから最初の整形式JSONオブジェクトを抽出
///
/// 前後の文章や ```json フェンスは無視する。`{` の位置ごとに
/// パースを試み、最初に成功したオブジェクトを返す。
///
/// # Examples
/// ```
/// use listing_ai_common::extract_json_object;
///
/// let response = "Sure! Here it is: {\"title\": \"Lamp\"} Hope that helps.";
/// assert_eq!(extract_json_object(response).unwrap(), "{\"title\": \"Lamp\"}");
/// ```
pub fn extract_json_object(response: &str) -> Result<&str> {
    for (start, _) in response.match_indices('{') {
        let candidate = &response[start..];
        let mut stream = serde_json::Deserializer::from_str(candidate).into_iter::<Value>();
        if let Some(Ok(Value::Object(_))) = stream.next() {
            let end = stream.byte_offset();
            return Ok(&candidate[..end]);
        }
    }

    Err(Error::Parse("JSONオブジェクトが見つかりません".into()))
}

/// AIレスポンスを GeneratedContent にパース
///
/// - title: 空/欠落 → "Product for Sale"
/// - description: 空/欠落 → 汎用の説明文
/// - suggestedPrice: 負/欠落/数値以外 → 0
/// - category: 空/欠落 → "Other"
/// - condition: 5値に正規化、不明なら Good
/// - tags: 配列でなければ空
pub fn parse_generated_content(response: &str) -> Result<GeneratedContent> {
    let json_str = extract_json_object(response)?;
    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| Error::Parse(format!("JSONパースエラー: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| Error::Parse("JSONオブジェクトではありません".into()))?;

    Ok(GeneratedContent {
        title: truncate_chars(
            &non_empty_string(object, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            TITLE_MAX_CHARS,
        ),
        description: truncate_chars(
            &non_empty_string(object, "description")
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            DESCRIPTION_MAX_CHARS,
        ),
        suggested_price: price_value(object.get("suggestedPrice")),
        category: non_empty_string(object, "category")
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        condition: object
            .get("condition")
            .and_then(Value::as_str)
            .map(Condition::normalize)
            .unwrap_or_default(),
        tags: tag_list(object.get("tags")),
    })
}

fn non_empty_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn price_value(value: Option<&Value>) -> f64 {
    let price = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_start_matches('$').parse::<f64>().ok(),
        _ => None,
    };
    price.filter(|p| p.is_finite() && *p > 0.0).unwrap_or(0.0)
}

fn tag_list(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    let mut tags: Vec<String> = Vec::new();
    for tag in items.iter().filter_map(Value::as_str).map(str::trim) {
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// 文字数（char単位）で切り詰める
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // extract_json_object テスト
    // =============================================

    #[test]
    fn test_extract_with_surrounding_prose() {
        let response = r#"Here is the listing: {"title": "Desk"} Let me know!"#;
        assert_eq!(extract_json_object(response).unwrap(), r#"{"title": "Desk"}"#);
    }

    #[test]
    fn test_extract_with_json_block() {
        let response = "```json\n{\n  \"title\": \"Desk\"\n}\n```";
        let json = extract_json_object(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.contains("Desk"));
    }

    #[test]
    fn test_extract_skips_malformed_brace() {
        // 最初の { は壊れているので次の整形式オブジェクトを返す
        let response = r#"Notes {not json} then {"title": "Lamp", "tags": ["a"]} trailing }"#;
        assert_eq!(
            extract_json_object(response).unwrap(),
            r#"{"title": "Lamp", "tags": ["a"]}"#
        );
    }

    #[test]
    fn test_extract_returns_first_of_two_objects() {
        let response = r#"{"title": "First"} {"title": "Second"}"#;
        assert_eq!(extract_json_object(response).unwrap(), r#"{"title": "First"}"#);
    }

    #[test]
    fn test_extract_nested_object() {
        let response = r#"{"title": "Bike", "meta": {"size": "M"}}"#;
        assert_eq!(extract_json_object(response).unwrap(), response);
    }

    #[test]
    fn test_extract_error() {
        let result = extract_json_object("No JSON here, just plain text.");
        assert!(matches!(result, Err(Error::Parse(_))));
        assert!(extract_json_object("").is_err());
        assert!(extract_json_object("[1, 2, 3]").is_err());
    }

    // =============================================
    // parse_generated_content テスト
    // =============================================

    #[test]
    fn test_parse_full_response() {
        let response = r#"```json
{
  "title": "Vintage Road Bike",
  "description": "Lightweight steel frame.",
  "suggestedPrice": 180,
  "category": "Sports",
  "condition": "Like-New",
  "tags": ["bike", "road", "vintage"]
}
```"#;
        let content = parse_generated_content(response).unwrap();
        assert_eq!(content.title, "Vintage Road Bike");
        assert_eq!(content.description, "Lightweight steel frame.");
        assert_eq!(content.suggested_price, 180.0);
        assert_eq!(content.category, "Sports");
        assert_eq!(content.condition, Condition::LikeNew);
        assert_eq!(content.tags, vec!["bike", "road", "vintage"]);
    }

    #[test]
    fn test_parse_defaults_every_field() {
        let response = r#"Sure, here's my analysis of the photo. {"title":"","description":"x","suggestedPrice":-5,"category":"","condition":"WEIRD","tags":"notarray"}"#;
        let content = parse_generated_content(response).unwrap();
        assert_eq!(
            content,
            GeneratedContent {
                title: "Product for Sale".to_string(),
                description: "x".to_string(),
                suggested_price: 0.0,
                category: "Other".to_string(),
                condition: Condition::Good,
                tags: vec![],
            }
        );
    }

    #[test]
    fn test_parse_missing_fields() {
        let content = parse_generated_content("{}").unwrap();
        assert_eq!(content.title, DEFAULT_TITLE);
        assert_eq!(content.description, DEFAULT_DESCRIPTION);
        assert_eq!(content.suggested_price, 0.0);
        assert_eq!(content.category, DEFAULT_CATEGORY);
        assert_eq!(content.condition, Condition::Good);
        assert!(content.tags.is_empty());
    }

    #[test]
    fn test_parse_numeric_string_price_and_mixed_tags() {
        let response = r#"{"suggestedPrice": "$45.5", "tags": ["desk", 3, "desk", " oak "]}"#;
        let content = parse_generated_content(response).unwrap();
        assert_eq!(content.suggested_price, 45.5);
        assert_eq!(content.tags, vec!["desk", "oak"]);
    }

    #[test]
    fn test_parse_truncates_long_title() {
        let long_title = "A".repeat(150);
        let response = format!(r#"{{"title": "{}"}}"#, long_title);
        let content = parse_generated_content(&response).unwrap();
        assert_eq!(content.title.chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn test_parse_error() {
        let result = parse_generated_content("I could not analyze this image.");
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
