use crate::error::{ListingError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODELS_ENDPOINT: &str = "https://api.openai.com/v1/models";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 複数画像用モデル
    pub model: String,
    /// 1枚用モデル
    pub single_image_model: String,
    pub endpoint: String,
    pub models_endpoint: String,
    pub timeout_seconds: u64,
    /// 価格を尋ねる通貨コード
    pub currency: String,
    pub currency_symbol: String,
    /// 透かし画像の最大幅(px)
    pub watermark_width: u32,
    /// 透かし画像のJPEG品質 (0-100)
    pub watermark_quality: u8,
    /// 写真ライブラリの保存先（省略時はピクチャフォルダ）
    pub gallery_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "gpt-4o".into(),
            single_image_model: "gpt-4o-mini".into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            models_endpoint: DEFAULT_MODELS_ENDPOINT.into(),
            timeout_seconds: 60,
            currency: "AUD".into(),
            currency_symbol: "$".into(),
            watermark_width: 1200,
            watermark_quality: 90,
            gallery_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ListingError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("listing-ai"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// 認証情報などのキー・バリューストア
    pub fn store_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("store.json"))
    }

    /// 透かし画像などの一時出力先
    pub fn cache_dir() -> Result<PathBuf> {
        let base = dirs::cache_dir()
            .ok_or_else(|| ListingError::Config("キャッシュディレクトリが見つかりません".into()))?;
        Ok(base.join("listing-ai"))
    }

    pub fn gallery_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.gallery_dir {
            return Ok(dir.clone());
        }
        let pictures = dirs::picture_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| ListingError::Config("写真の保存先が見つかりません".into()))?;
        Ok(pictures.join("listing-ai"))
    }

    pub fn model_for(&self, image_count: usize) -> &str {
        if image_count > 1 {
            &self.model
        } else {
            &self.single_image_model
        }
    }
}
