//! AIによる出品情報生成（Chat Completions API連携）
//!
//! 画像は何枚でも1回のリクエストにまとめて送る（画像ごとに分割しない）。
//! レスポンスの自由文から JSON オブジェクトを取り出し、各項目を既定値で補う。

use crate::config::Config;
use crate::error::{GenerationError, ListingError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use listing_ai_common::{
    build_listing_prompt, parse_generated_content, system_prompt, CapturedImage, GeneratedContent,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

const SINGLE_IMAGE_MAX_TOKENS: u32 = 1000;
const MULTI_IMAGE_MAX_TOKENS: u32 = 1500;
const TEMPERATURE: f32 = 0.7;
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Chat Completions リクエスト
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<Part>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ChatRequest {
    /// 添付画像の枚数
    pub fn image_count(&self) -> usize {
        self.messages
            .iter()
            .filter_map(|m| match &m.content {
                MessageContent::Parts(parts) => Some(parts),
                MessageContent::Text(_) => None,
            })
            .flatten()
            .filter(|p| matches!(p, Part::ImageUrl { .. }))
            .count()
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// 生成APIとの通信
#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// リクエストを送り、モデルの応答テキストを返す
    async fn complete(&self, request: &ChatRequest) -> std::result::Result<String, GenerationError>;

    /// 接続確認
    async fn ping(&self) -> bool;
}

/// HTTPステータスを分類（成功なら None）
pub fn classify_status(status: u16) -> Option<GenerationError> {
    match status {
        200..=299 => None,
        401 | 403 => Some(GenerationError::Unauthorized),
        429 => Some(GenerationError::RateLimited),
        code => Some(GenerationError::Status(code)),
    }
}

fn classify_transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Network("タイムアウトしました".into())
    } else {
        GenerationError::Network(e.to_string())
    }
}

/// reqwest による実装（Bearer 認証）
pub struct OpenAiTransport {
    client: reqwest::Client,
    endpoint: String,
    models_endpoint: String,
    api_key: String,
}

impl OpenAiTransport {
    pub fn new(config: &Config, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ListingError::Config(format!("HTTPクライアントの初期化に失敗: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            models_endpoint: config.models_endpoint.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl CompletionTransport for OpenAiTransport {
    async fn complete(&self, request: &ChatRequest) -> std::result::Result<String, GenerationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        if let Some(err) = classify_status(status) {
            let body = response.text().await.unwrap_or_default();
            warn!("生成APIエラー (HTTP {}): {}", status, body.chars().take(200).collect::<String>());
            return Err(err);
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(format!("レスポンス形式が不正: {}", e)))?;

        payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| GenerationError::Malformed("空のレスポンス".into()))
    }

    async fn ping(&self) -> bool {
        let result = self
            .client
            .get(&self.models_endpoint)
            .bearer_auth(&self.api_key)
            .timeout(PING_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("接続テストに失敗: {}", e);
                false
            }
        }
    }
}

/// AIによる生成
pub struct AiGenerator {
    transport: Box<dyn CompletionTransport>,
    config: Config,
}

impl AiGenerator {
    pub fn new(transport: impl CompletionTransport + 'static, config: &Config) -> Self {
        Self {
            transport: Box::new(transport),
            config: config.clone(),
        }
    }

    /// 全画像を1回のリクエストで送って生成
    pub async fn generate(&self, images: &[CapturedImage]) -> Result<GeneratedContent> {
        let request = self.build_request(images).await?;
        info!("AI解析中... ({}枚, {})", images.len(), request.model);

        let response = self.transport.complete(&request).await?;
        debug!("レスポンス長: {} chars", response.len());

        parse_generated_content(&response)
            .map_err(|e| GenerationError::Malformed(e.to_string()).into())
    }

    pub async fn test_connection(&self) -> bool {
        self.transport.ping().await
    }

    pub async fn build_request(&self, images: &[CapturedImage]) -> Result<ChatRequest> {
        let mut parts = vec![Part::Text {
            text: build_listing_prompt(images.len(), &self.config.currency),
        }];

        for image in images {
            parts.push(Part::ImageUrl {
                image_url: ImageUrl {
                    url: encode_data_url(Path::new(image.source_uri())).await?,
                },
            });
        }

        let max_tokens = if images.len() > 1 {
            MULTI_IMAGE_MAX_TOKENS
        } else {
            SINGLE_IMAGE_MAX_TOKENS
        };

        Ok(ChatRequest {
            model: self.config.model_for(images.len()).to_string(),
            messages: vec![
                Message {
                    role: "system",
                    content: MessageContent::Text(system_prompt(images.len()).to_string()),
                },
                Message {
                    role: "user",
                    content: MessageContent::Parts(parts),
                },
            ],
            max_tokens,
            temperature: TEMPERATURE,
        })
    }
}

/// 画像ファイルを data URL（base64）に変換
async fn encode_data_url(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        ListingError::Acquisition(format!("画像の読み込みに失敗 {}: {}", path.display(), e))
    })?;
    Ok(format!(
        "data:{};base64,{}",
        mime_type_for(path),
        STANDARD.encode(bytes)
    ))
}

fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "image/jpeg",
    }
}
