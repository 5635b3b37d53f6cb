//! 結合テスト用のモック
//!
//! 状態は Arc で共有し、サービスへ渡した後も呼び出し内容を確認できるようにする。

#![allow(dead_code)]

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use listing_ai_rust::generator::{ChatRequest, CompletionTransport};
use listing_ai_rust::handoff::{Clipboard, PhotoLibrary, Ports, ShareSheet, UrlOpener};
use listing_ai_rust::GenerationError;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 実際にデコードできるPNGを書き出す
pub fn write_png(path: &Path, width: u32, height: u32) -> PathBuf {
    RgbImage::from_pixel(width, height, Rgb([200, 180, 160]))
        .save(path)
        .unwrap();
    path.to_path_buf()
}

/// 生成APIのモック（受け取ったリクエストを記録）
#[derive(Clone)]
pub struct MockTransport {
    response: std::result::Result<String, GenerationError>,
    pub requests: Arc<Mutex<Vec<ChatRequest>>>,
    pub reachable: bool,
}

impl MockTransport {
    pub fn replying(body: &str) -> Self {
        Self {
            response: Ok(body.to_string()),
            requests: Arc::default(),
            reachable: true,
        }
    }

    pub fn failing(error: GenerationError) -> Self {
        Self {
            response: Err(error),
            requests: Arc::default(),
            reachable: false,
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl CompletionTransport for MockTransport {
    async fn complete(&self, request: &ChatRequest) -> std::result::Result<String, GenerationError> {
        lock(&self.requests).push(request.clone());
        self.response.clone()
    }

    async fn ping(&self) -> bool {
        self.reachable
    }
}

#[derive(Clone, Default)]
pub struct MockClipboard {
    pub texts: Arc<Mutex<Vec<String>>>,
    pub broken: bool,
}

impl MockClipboard {
    pub fn last(&self) -> Option<String> {
        lock(&self.texts).last().cloned()
    }

    pub fn count(&self) -> usize {
        lock(&self.texts).len()
    }
}

#[async_trait]
impl Clipboard for MockClipboard {
    async fn set_text(&self, text: &str) -> anyhow::Result<()> {
        if self.broken {
            anyhow::bail!("clipboard unavailable");
        }
        lock(&self.texts).push(text.to_string());
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockPhotoLibrary {
    pub granted: bool,
    /// この文字列を含むURIは保存に失敗する
    pub fail_on: Option<String>,
    pub saved: Arc<Mutex<Vec<String>>>,
    pub permission_requests: Arc<Mutex<usize>>,
}

impl Default for MockPhotoLibrary {
    fn default() -> Self {
        Self {
            granted: true,
            fail_on: None,
            saved: Arc::default(),
            permission_requests: Arc::default(),
        }
    }
}

impl MockPhotoLibrary {
    pub fn saved(&self) -> Vec<String> {
        lock(&self.saved).clone()
    }
}

#[async_trait]
impl PhotoLibrary for MockPhotoLibrary {
    async fn request_permission(&self) -> anyhow::Result<bool> {
        *lock(&self.permission_requests) += 1;
        Ok(self.granted)
    }

    async fn save(&self, uri: &str) -> anyhow::Result<()> {
        if let Some(marker) = &self.fail_on {
            if uri.contains(marker.as_str()) {
                anyhow::bail!("disk full");
            }
        }
        lock(&self.saved).push(uri.to_string());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct MockUrlOpener {
    /// 開けるURL
    pub openable: Vec<String>,
    pub probed: Arc<Mutex<Vec<String>>>,
    pub opened: Arc<Mutex<Vec<String>>>,
}

impl MockUrlOpener {
    pub fn with_openable(urls: &[&str]) -> Self {
        Self {
            openable: urls.iter().map(|u| u.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn probed(&self) -> Vec<String> {
        lock(&self.probed).clone()
    }

    pub fn opened(&self) -> Vec<String> {
        lock(&self.opened).clone()
    }
}

#[async_trait]
impl UrlOpener for MockUrlOpener {
    async fn can_open(&self, url: &str) -> anyhow::Result<bool> {
        lock(&self.probed).push(url.to_string());
        Ok(self.openable.iter().any(|u| u == url))
    }

    async fn open(&self, url: &str) -> anyhow::Result<()> {
        lock(&self.opened).push(url.to_string());
        Ok(())
    }
}

#[derive(Clone)]
pub struct MockShareSheet {
    /// None なら共有シート自体が失敗する
    pub outcome: Option<bool>,
    pub shared: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockShareSheet {
    pub fn answering(outcome: Option<bool>) -> Self {
        Self {
            outcome,
            shared: Arc::default(),
        }
    }

    pub fn shared(&self) -> Vec<(String, String)> {
        lock(&self.shared).clone()
    }
}

#[async_trait]
impl ShareSheet for MockShareSheet {
    async fn share(&self, message: &str, title: &str) -> anyhow::Result<bool> {
        lock(&self.shared).push((message.to_string(), title.to_string()));
        self.outcome
            .ok_or_else(|| anyhow::anyhow!("share sheet failed"))
    }
}

/// モック一式（clone はサービスへ渡し、手元のものは検証に使う）
#[derive(Clone)]
pub struct MockPlatform {
    pub clipboard: MockClipboard,
    pub photos: MockPhotoLibrary,
    pub urls: MockUrlOpener,
    pub share: MockShareSheet,
}

impl MockPlatform {
    pub fn new(openable: &[&str], share_outcome: Option<bool>) -> Self {
        Self {
            clipboard: MockClipboard::default(),
            photos: MockPhotoLibrary::default(),
            urls: MockUrlOpener::with_openable(openable),
            share: MockShareSheet::answering(share_outcome),
        }
    }

    pub fn ports(&self) -> Ports {
        Ports {
            clipboard: Box::new(self.clipboard.clone()),
            photos: Box::new(self.photos.clone()),
            urls: Box::new(self.urls.clone()),
            share: Box::new(self.share.clone()),
        }
    }
}
