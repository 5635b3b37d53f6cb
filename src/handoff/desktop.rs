//! 端末環境向けのOS機能実装

use super::{Clipboard, PhotoLibrary, ShareSheet, UrlOpener};
use anyhow::Context;
use async_trait::async_trait;
use dialoguer::Confirm;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// クリップボード代わりにファイルへ書き出す
pub struct FileClipboard {
    path: PathBuf,
}

impl FileClipboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Clipboard for FileClipboard {
    async fn set_text(&self, text: &str) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, text)
            .await
            .with_context(|| format!("書き込めません: {}", self.path.display()))?;
        debug!("クリップボード → {}", self.path.display());
        Ok(())
    }
}

/// 指定フォルダを写真ライブラリとして扱う
pub struct DirectoryPhotoLibrary {
    dir: PathBuf,
}

impl DirectoryPhotoLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl PhotoLibrary for DirectoryPhotoLibrary {
    async fn request_permission(&self) -> anyhow::Result<bool> {
        if tokio::fs::create_dir_all(&self.dir).await.is_err() {
            return Ok(false);
        }
        let metadata = tokio::fs::metadata(&self.dir).await?;
        Ok(metadata.is_dir() && !metadata.permissions().readonly())
    }

    async fn save(&self, uri: &str) -> anyhow::Result<()> {
        let source = Path::new(uri);
        let file_name = source
            .file_name()
            .with_context(|| format!("ファイル名がありません: {}", uri))?;

        let mut dest = self.dir.join(file_name);
        if tokio::fs::try_exists(&dest).await? {
            let millis = chrono::Utc::now().timestamp_millis();
            dest = self
                .dir
                .join(format!("{}_{}", millis, file_name.to_string_lossy()));
        }

        tokio::fs::copy(source, &dest)
            .await
            .with_context(|| format!("コピーできません: {} → {}", uri, dest.display()))?;
        debug!("写真保存: {}", dest.display());
        Ok(())
    }
}

/// OSの既定ハンドラでURLを開く
pub struct SystemUrlOpener;

fn scheme_of(url: &str) -> Option<&str> {
    url.split_once(':')
        .map(|(scheme, _)| scheme)
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || "+-.".contains(c)))
}

#[async_trait]
impl UrlOpener for SystemUrlOpener {
    async fn can_open(&self, url: &str) -> anyhow::Result<bool> {
        let scheme = match scheme_of(url) {
            Some(scheme) => scheme.to_lowercase(),
            None => return Ok(false),
        };
        if scheme == "http" || scheme == "https" {
            return Ok(true);
        }
        has_scheme_handler(&scheme).await
    }

    async fn open(&self, url: &str) -> anyhow::Result<()> {
        #[cfg(windows)]
        let status = Command::new("cmd")
            .args(["/c", "start", "", url])
            .status()
            .await?;

        #[cfg(target_os = "macos")]
        let status = Command::new("open").arg(url).status().await?;

        #[cfg(not(any(windows, target_os = "macos")))]
        let status = Command::new("xdg-open").arg(url).status().await?;

        if !status.success() {
            anyhow::bail!("URLを開けません (code {:?}): {}", status.code(), url);
        }
        Ok(())
    }
}

#[cfg(not(any(windows, target_os = "macos")))]
async fn has_scheme_handler(scheme: &str) -> anyhow::Result<bool> {
    let output = Command::new("xdg-mime")
        .args(["query", "default", &format!("x-scheme-handler/{}", scheme)])
        .output()
        .await
        .context("xdg-mime 実行エラー")?;
    Ok(output.status.success() && !String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

#[cfg(any(windows, target_os = "macos"))]
async fn has_scheme_handler(_scheme: &str) -> anyhow::Result<bool> {
    Ok(false)
}

/// 内容を表示して共有するか尋ねる
pub struct PromptShareSheet;

#[async_trait]
impl ShareSheet for PromptShareSheet {
    async fn share(&self, message: &str, title: &str) -> anyhow::Result<bool> {
        println!("\n=== {} ===\n{}\n", title, message);

        let accepted = tokio::task::spawn_blocking(|| {
            Confirm::new()
                .with_prompt("この内容を共有しますか?")
                .default(true)
                .interact()
        })
        .await??;
        Ok(accepted)
    }
}
