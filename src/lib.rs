//! Listing AI - 商品写真からマーケットプレイス出品情報を作る
//!
//! 撮影/選択 → (検出 →) 生成 → 透かし → 下書き編集 → 受け渡し

pub mod capture;
pub mod cli;
pub mod config;
pub mod credential;
pub mod detector;
pub mod error;
pub mod generator;
pub mod handoff;
pub mod pipeline;
pub mod watermark;

pub use config::Config;
pub use credential::{CredentialResolver, CredentialSource};
pub use error::{GenerationError, ListingError, Result};
pub use generator::{ContentGenerator, Generation, Strategy};
pub use handoff::{HandoffService, Ports, SaveOutcome};
pub use pipeline::{ListingPipeline, Screening};
pub use watermark::WatermarkProcessor;
