//! Listing AI Common Library
//!
//! CLIとライブラリ本体で共有される型とユーティリティ（I/Oなし）

pub mod draft;
pub mod eligibility;
pub mod error;
pub mod handoff;
pub mod parser;
pub mod pricing;
pub mod prompts;
pub mod templates;
pub mod types;

pub use draft::{
    format_price, DraftField, FieldUpdate, InvalidField, ListingDraft, ValidationResult,
    DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS,
};
pub use eligibility::is_eligible_for_marketplace;
pub use error::{Error, Result};
pub use handoff::{
    compose_post_text, copy_notice, detailed_text, shareable_text, HandoffField, HandoffRecord,
};
pub use parser::{extract_json_object, parse_generated_content};
pub use pricing::{suggest_price, suggest_price_for};
pub use prompts::{build_listing_prompt, system_prompt};
pub use templates::template_content;
pub use types::{
    CapturedImage, Condition, DetectedObject, GeneratedContent, ImageOrigin, WatermarkState,
};
