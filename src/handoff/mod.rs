//! マーケットプレイスへの受け渡し
//!
//! 出品情報をクリップボードへコピーし、カメラ画像を写真ライブラリへ保存し、
//! 外部アプリをディープリンクで開く（開けなければ共有シート）。
//! 記録の更新は利用者の明示的な操作でのみ行う。

mod desktop;
mod fallback;

pub use desktop::{DirectoryPhotoLibrary, FileClipboard, PromptShareSheet, SystemUrlOpener};
pub use fallback::try_in_order;

use crate::error::{ListingError, Result};
use async_trait::async_trait;
use listing_ai_common::{
    compose_post_text, copy_notice, detailed_text, shareable_text, DraftField, HandoffField,
    HandoffRecord, ListingDraft,
};
use tracing::{info, warn};

/// 出品作成 → マーケットプレイス → フィード
pub const MARKETPLACE_LINKS: [&str; 3] = ["fb://marketplace/create", "fb://marketplace", "fb://feed"];

/// Android → iOS
pub const APP_STORE_LINKS: [&str; 2] = [
    "market://details?id=com.facebook.katana",
    "https://apps.apple.com/app/facebook/id284882215",
];

/// デスクトップ版 → モバイル版
pub const WEBSITE_LINKS: [&str; 2] = [
    "https://www.facebook.com/marketplace/create",
    "https://m.facebook.com/marketplace/create",
];

const POST_SHARE_TITLE: &str = "Post to Facebook Marketplace";

#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn set_text(&self, text: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait PhotoLibrary: Send + Sync {
    /// 書き込み許可を求める
    async fn request_permission(&self) -> anyhow::Result<bool>;

    async fn save(&self, uri: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn can_open(&self, url: &str) -> anyhow::Result<bool>;

    async fn open(&self, url: &str) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ShareSheet: Send + Sync {
    /// 共有されたら true、キャンセルなら false
    async fn share(&self, message: &str, title: &str) -> anyhow::Result<bool>;
}

/// OS機能の実装一式
pub struct Ports {
    pub clipboard: Box<dyn Clipboard>,
    pub photos: Box<dyn PhotoLibrary>,
    pub urls: Box<dyn UrlOpener>,
    pub share: Box<dyn ShareSheet>,
}

/// 写真保存の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { saved: usize, failed: usize },
    /// カメラ画像が1枚もない
    NothingToSave,
}

pub struct HandoffService {
    ports: Ports,
    record: HandoffRecord,
    currency_symbol: String,
}

impl HandoffService {
    pub fn new(ports: Ports, currency_symbol: impl Into<String>) -> Self {
        Self {
            ports,
            record: HandoffRecord::new(),
            currency_symbol: currency_symbol.into(),
        }
    }

    pub fn record(&self) -> &HandoffRecord {
        &self.record
    }

    pub fn completion_percentage(&self) -> u8 {
        self.record.completion_percentage()
    }

    /// 1項目をクリップボードへコピーし、通知文を返す
    pub async fn copy_field(&mut self, draft: &ListingDraft, field: DraftField) -> Result<&'static str> {
        let value = draft.field_value(field);
        self.set_clipboard(&value).await?;

        if let Some(recorded) = HandoffField::from_draft_field(field) {
            self.record.insert(recorded);
        }
        info!("コピー: {} ({}%)", field, self.completion_percentage());
        Ok(copy_notice(field))
    }

    /// カメラ画像（透かし済みを優先）を写真ライブラリへ保存
    pub async fn save_images(&mut self, draft: &ListingDraft) -> Result<SaveOutcome> {
        let uris: Vec<&str> = draft.camera_images().map(|img| img.preferred_uri()).collect();
        if uris.is_empty() {
            info!("保存するカメラ画像がありません");
            return Ok(SaveOutcome::NothingToSave);
        }

        let granted = self.ports.photos.request_permission().await.map_err(|e| {
            ListingError::Persistence(format!("写真ライブラリの許可確認に失敗: {:#}", e))
        })?;
        if !granted {
            return Err(ListingError::Persistence(
                "写真ライブラリへの保存が許可されていません".into(),
            ));
        }

        let mut saved = 0;
        let mut failed = 0;
        for uri in uris {
            match self.ports.photos.save(uri).await {
                Ok(()) => saved += 1,
                Err(e) => {
                    warn!("写真の保存に失敗 {}: {:#}", uri, e);
                    failed += 1;
                }
            }
        }

        self.record.insert(HandoffField::Photo);
        info!("写真保存: 成功 {} / 失敗 {}", saved, failed);
        Ok(SaveOutcome::Saved { saved, failed })
    }

    /// 検証 → コピー → 写真保存 → ディープリンク（だめなら共有シート）
    ///
    /// 検証に失敗した場合は何もしない。アプリを開けなかった場合でも
    /// コピーと保存は取り消さない。
    pub async fn post_to_marketplace(&mut self, draft: &ListingDraft) -> Result<bool> {
        draft.validate()?;

        let text = compose_post_text(draft, &self.currency_symbol);
        self.set_clipboard(&text).await?;

        if let Err(e) = self.save_images(draft).await {
            warn!("写真を保存できませんでした（投稿は続行）: {}", e);
        }
        self.record.mark_all();

        if self.open_first(&MARKETPLACE_LINKS).await {
            info!("マーケットプレイスを開きました");
            return Ok(true);
        }

        info!("アプリを開けないため共有シートを表示します");
        self.ports
            .share
            .share(&text, POST_SHARE_TITLE)
            .await
            .map_err(|e| {
                ListingError::Handoff(format!(
                    "アプリを開けませんでした（出品情報はコピー済みです）: {:#}",
                    e
                ))
            })
    }

    /// 共有用テキストをコピーして共有シートを開く
    pub async fn share_listing(&self, draft: &ListingDraft) -> Result<bool> {
        let text = shareable_text(draft, &self.currency_symbol);
        self.set_clipboard(&text).await?;

        let title = format!("For Sale: {}", draft.title());
        self.ports
            .share
            .share(&text, &title)
            .await
            .map_err(|e| ListingError::Handoff(format!("共有に失敗: {:#}", e)))
    }

    pub async fn open_app_store(&self) -> bool {
        self.open_first(&APP_STORE_LINKS).await
    }

    pub async fn open_website(&self) -> bool {
        self.open_first(&WEBSITE_LINKS).await
    }

    /// 詳細テキストをクリップボードへ（下書きとして控える）
    pub async fn save_draft_text(&self, draft: &ListingDraft) -> Result<()> {
        let text = detailed_text(draft, &self.currency_symbol);
        self.set_clipboard(&text).await
    }

    async fn open_first(&self, links: &[&'static str]) -> bool {
        let urls = &self.ports.urls;
        try_in_order(links, |url| urls.can_open(url), |url| urls.open(url)).await
    }

    async fn set_clipboard(&self, text: &str) -> Result<()> {
        self.ports
            .clipboard
            .set_text(text)
            .await
            .map_err(|e| ListingError::Handoff(format!("クリップボードへのコピーに失敗: {:#}", e)))
    }
}
