//! APIキーの解決
//!
//! 優先順位: セッション内キャッシュ → 利用者が保存した値 → ビルド時の既定値。
//! どれもなければ「認証情報なし」で、定型文による生成に切り替わる。

use crate::error::{ListingError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// ストア上のキー
pub const CREDENTIAL_KEY: &str = "@selleasy:chatgpt_api_key";

/// .env 雛形のままの値は未設定とみなす
const PLACEHOLDER_KEY: &str = "your_openai_api_key_here";

/// 永続キー・バリューストア
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// JSONファイルに保存するストア
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_all(&self) -> anyhow::Result<HashMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, entries: &HashMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.read_all().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries).await
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut entries = self.read_all().await?;
        if entries.remove(key).is_some() {
            self.write_all(&entries).await?;
        }
        Ok(())
    }
}

/// メモリ上のストア
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

/// APIキーの出どころ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    User,
    Build,
    None,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::User => write!(f, "user"),
            CredentialSource::Build => write!(f, "build"),
            CredentialSource::None => write!(f, "none"),
        }
    }
}

/// APIキー解決器
///
/// アプリ起動時に生成し、以後はこのオブジェクト経由で読み書きする。
/// 書き込みは後勝ち。
pub struct CredentialResolver {
    store: Box<dyn KeyValueStore>,
    session: RwLock<Option<String>>,
    build_default: Option<String>,
}

impl CredentialResolver {
    /// ビルド時の環境変数 OPENAI_API_KEY を既定値として使う
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self::with_build_default(store, option_env!("OPENAI_API_KEY").map(str::to_string))
    }

    pub fn with_build_default(
        store: impl KeyValueStore + 'static,
        build_default: Option<String>,
    ) -> Self {
        let build_default = build_default.filter(|key| usable(key));
        Self {
            store: Box::new(store),
            session: RwLock::new(None),
            build_default,
        }
    }

    /// 利用者のキーを保存（セッションキャッシュも更新）
    pub async fn set(&self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ListingError::Config("APIキーが空です".into()));
        }
        *self.session.write().await = Some(key.to_string());
        self.store
            .set(CREDENTIAL_KEY, key)
            .await
            .map_err(|e| ListingError::Persistence(format!("APIキーの保存に失敗: {}", e)))?;
        debug!("APIキーを保存しました");
        Ok(())
    }

    /// 保存済みのキーとセッションキャッシュを削除
    pub async fn clear(&self) -> Result<()> {
        *self.session.write().await = None;
        self.store
            .remove(CREDENTIAL_KEY)
            .await
            .map_err(|e| ListingError::Persistence(format!("APIキーの削除に失敗: {}", e)))
    }

    /// 優先順位に従ってキーを解決
    ///
    /// ストアの読み込み失敗は警告してビルド時の既定値へ進む
    pub async fn get(&self) -> Option<String> {
        if let Some(key) = self.session.read().await.clone() {
            return Some(key);
        }

        let resolved = match self.stored_key().await {
            Some(key) => Some(key),
            None => self.build_default.clone(),
        };

        if let Some(key) = &resolved {
            *self.session.write().await = Some(key.clone());
        }
        resolved
    }

    /// キーの出どころ（表示用。セッションキャッシュは見ない）
    pub async fn source(&self) -> CredentialSource {
        if self.stored_key().await.is_some() {
            CredentialSource::User
        } else if self.build_default.is_some() {
            CredentialSource::Build
        } else {
            CredentialSource::None
        }
    }

    async fn stored_key(&self) -> Option<String> {
        match self.store.get(CREDENTIAL_KEY).await {
            Ok(value) => value.filter(|key| usable(key)),
            Err(e) => {
                warn!("APIキーの読み込みに失敗: {}", e);
                None
            }
        }
    }
}

fn usable(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && key != PLACEHOLDER_KEY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_credential() {
        let resolver = CredentialResolver::with_build_default(MemoryStore::new(), None);
        assert_eq!(resolver.get().await, None);
        assert_eq!(resolver.source().await, CredentialSource::None);
    }

    #[tokio::test]
    async fn test_placeholder_build_default_is_ignored() {
        let resolver = CredentialResolver::with_build_default(
            MemoryStore::new(),
            Some(PLACEHOLDER_KEY.to_string()),
        );
        assert_eq!(resolver.get().await, None);
    }

    #[tokio::test]
    async fn test_stored_key_beats_build_default() {
        let store = MemoryStore::new();
        store.set(CREDENTIAL_KEY, "sk-user").await.unwrap();
        let resolver =
            CredentialResolver::with_build_default(store, Some("sk-build".to_string()));

        assert_eq!(resolver.get().await.as_deref(), Some("sk-user"));
        assert_eq!(resolver.source().await, CredentialSource::User);
    }

    #[tokio::test]
    async fn test_build_default_used_when_store_empty() {
        let resolver =
            CredentialResolver::with_build_default(MemoryStore::new(), Some("sk-build".into()));
        assert_eq!(resolver.get().await.as_deref(), Some("sk-build"));
        assert_eq!(resolver.source().await, CredentialSource::Build);
    }

    #[tokio::test]
    async fn test_set_and_clear() {
        let resolver = CredentialResolver::with_build_default(MemoryStore::new(), None);
        resolver.set("  sk-new  ").await.unwrap();
        assert_eq!(resolver.get().await.as_deref(), Some("sk-new"));

        // 後勝ち
        resolver.set("sk-newer").await.unwrap();
        assert_eq!(resolver.get().await.as_deref(), Some("sk-newer"));

        resolver.clear().await.unwrap();
        assert_eq!(resolver.get().await, None);
    }

    #[tokio::test]
    async fn test_set_rejects_empty_key() {
        let resolver = CredentialResolver::with_build_default(MemoryStore::new(), None);
        assert!(matches!(resolver.set("   ").await, Err(ListingError::Config(_))));
    }
}
