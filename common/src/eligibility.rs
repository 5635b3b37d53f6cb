//! 出品可否の簡易判定
//!
//! 検出クラス名に許可キーワードが含まれるかを大文字小文字を無視して調べる。
//! 警告用のヒューリスティックであり、利用者は否定結果を上書きして続行できる。

pub const MARKETPLACE_KEYWORDS: &[&str] = &[
    "laptop",
    "computer",
    "phone",
    "tablet",
    "camera",
    "watch",
    "book",
    "furniture",
    "chair",
    "table",
    "bicycle",
    "clothing",
    "shoes",
    "backpack",
    "bag",
    "television",
    "monitor",
    "keyboard",
    "mouse",
    "headphones",
    "speaker",
    "game console",
    "toy",
];

pub fn is_eligible_for_marketplace(object_class: &str) -> bool {
    let class = object_class.to_lowercase();
    MARKETPLACE_KEYWORDS
        .iter()
        .any(|keyword| class.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligible_case_insensitive_substring() {
        assert!(is_eligible_for_marketplace("Laptop"));
        assert!(is_eligible_for_marketplace("laptop bag"));
        assert!(is_eligible_for_marketplace("Office CHAIR"));
        assert!(is_eligible_for_marketplace("Game Console"));
    }

    #[test]
    fn test_not_eligible() {
        assert!(!is_eligible_for_marketplace("banana"));
        assert!(!is_eligible_for_marketplace("unknown"));
        assert!(!is_eligible_for_marketplace(""));
    }
}
