//! 出品情報の生成
//!
//! 定型文（オフライン・決定的）とAI（ネットワーク・非決定的）の2方式を
//! ContentGenerator の列挙で切り替える。呼び出し側が方式の違いを意識するのは
//! 定型文の場合にだけ検出結果が付く点のみ。

mod openai;
mod template;

pub use openai::{AiGenerator, ChatRequest, CompletionTransport, OpenAiTransport};
pub use template::TemplateGenerator;

use crate::config::Config;
use crate::credential::CredentialResolver;
use crate::detector::ObjectDetector;
use crate::error::{ListingError, Result};
use listing_ai_common::{CapturedImage, DetectedObject, GeneratedContent};
use tracing::info;

/// 生成結果
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub content: GeneratedContent,
    /// 定型文の場合のみ
    pub detection: Option<DetectedObject>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Template,
    Ai,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Template => write!(f, "template"),
            Strategy::Ai => write!(f, "ai"),
        }
    }
}

pub enum ContentGenerator {
    Template(TemplateGenerator),
    Ai(AiGenerator),
}

impl ContentGenerator {
    /// APIキーがあればAI、なければ定型文を選ぶ
    pub async fn select(
        config: &Config,
        credentials: &CredentialResolver,
        detector: ObjectDetector,
    ) -> Result<Self> {
        match credentials.get().await {
            Some(api_key) => {
                let transport = OpenAiTransport::new(config, api_key)?;
                info!("生成方式: AI ({})", config.model);
                Ok(ContentGenerator::Ai(AiGenerator::new(transport, config)))
            }
            None => {
                info!("生成方式: 定型文（APIキー未設定）");
                Ok(ContentGenerator::Template(TemplateGenerator::new(detector)))
            }
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            ContentGenerator::Template(_) => Strategy::Template,
            ContentGenerator::Ai(_) => Strategy::Ai,
        }
    }

    /// 画像群（と任意の検出ヒント）から出品情報を生成
    pub async fn generate(
        &self,
        images: &[CapturedImage],
        hint: Option<&DetectedObject>,
    ) -> Result<Generation> {
        if images.is_empty() {
            return Err(ListingError::NoImages);
        }

        match self {
            ContentGenerator::Template(generator) => generator.generate(images, hint).await,
            ContentGenerator::Ai(generator) => {
                let content = generator.generate(images).await?;
                Ok(Generation {
                    content,
                    detection: None,
                })
            }
        }
    }

    /// 定型文方式のときだけ代表画像を検出する（出品可否の警告用）
    pub async fn screen(&self, images: &[CapturedImage]) -> Option<DetectedObject> {
        match self {
            ContentGenerator::Template(generator) => match images.first() {
                Some(primary) => Some(generator.detector().detect(primary).await),
                None => None,
            },
            ContentGenerator::Ai(_) => None,
        }
    }
}
