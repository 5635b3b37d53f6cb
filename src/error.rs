use listing_ai_common::InvalidField;
use thiserror::Error;

/// 出品情報生成の失敗（ネットワーク・認証・応答形式）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("APIキーが設定されていません。`listing-ai config --set-api-key YOUR_KEY` で設定してください")]
    MissingCredential,

    #[error("APIキーが無効です。設定を確認してください")]
    Unauthorized,

    #[error("レート制限を超えました。しばらくしてから再試行してください")]
    RateLimited,

    #[error("APIエラー: HTTP {0}")]
    Status(u16),

    #[error("通信エラー: {0}")]
    Network(String),

    #[error("malformed AI response: {0}")]
    Malformed(String),
}

impl GenerationError {
    /// 同じ入力での再試行に意味があるか
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::RateLimited | GenerationError::Network(_) => true,
            GenerationError::Status(code) => *code >= 500,
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum ListingError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("画像取得エラー: {0}")]
    Acquisition(String),

    #[error("画像がありません。撮影または選択してください")]
    NoImages,

    #[error("出品情報の生成に失敗: {0}")]
    Generation(#[from] GenerationError),

    #[error("入力エラー: {0}")]
    Validation(#[from] InvalidField),

    #[error("受け渡しエラー: {0}")]
    Handoff(String),

    #[error("保存エラー: {0}")]
    Persistence(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(listing_ai_common::Error),
}

impl From<listing_ai_common::Error> for ListingError {
    fn from(err: listing_ai_common::Error) -> Self {
        match err {
            listing_ai_common::Error::NoImages => ListingError::NoImages,
            other => ListingError::Common(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ListingError>;
