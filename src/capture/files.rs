//! ファイルシステム上の画像を取得元とするアダプタ（CLI用）

use super::{is_image_extension, ImageCapture};
use crate::error::{ListingError, Result};
use async_trait::async_trait;
use listing_ai_common::CapturedImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use walkdir::WalkDir;

/// 指定されたファイルを順に「撮影」するカメラ
///
/// 撮影待ちのファイルがなくなるとキャンセル扱い（None）になる。
pub struct FileCamera {
    shots: Mutex<VecDeque<PathBuf>>,
}

impl FileCamera {
    pub fn new(shots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            shots: Mutex::new(shots.into_iter().collect()),
        }
    }

    fn next_shot(&self) -> Result<Option<PathBuf>> {
        let mut shots = self
            .shots
            .lock()
            .map_err(|_| ListingError::Acquisition("カメラの状態が壊れています".into()))?;
        Ok(shots.pop_front())
    }
}

#[async_trait]
impl ImageCapture for FileCamera {
    async fn capture(&self) -> Result<Option<CapturedImage>> {
        let Some(path) = self.next_shot()? else {
            return Ok(None);
        };

        if !path.is_file() {
            return Err(ListingError::Acquisition(format!(
                "撮影ファイルが見つかりません: {}",
                path.display()
            )));
        }

        debug!("撮影: {}", path.display());
        Ok(Some(CapturedImage::camera(path.display().to_string())))
    }

    async fn pick_from_library(&self, _allow_multiple: bool) -> Result<Vec<CapturedImage>> {
        Ok(Vec::new())
    }
}

/// フォルダ（または単一ファイル）をライブラリとして扱う
pub struct FolderLibrary {
    root: PathBuf,
}

impl FolderLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageCapture for FolderLibrary {
    async fn capture(&self) -> Result<Option<CapturedImage>> {
        Ok(None)
    }

    async fn pick_from_library(&self, allow_multiple: bool) -> Result<Vec<CapturedImage>> {
        let mut paths = scan_library(&self.root)?;
        if !allow_multiple {
            paths.truncate(1);
        }

        debug!("ライブラリから{}枚選択: {}", paths.len(), self.root.display());
        Ok(paths
            .into_iter()
            .map(|p| CapturedImage::gallery(p.display().to_string()))
            .collect())
    }
}

/// 直下の画像ファイルをファイル名順で返す
fn scan_library(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(ListingError::Acquisition(format!(
            "ライブラリが見つかりません: {}",
            root.display()
        )));
    }

    if root.is_file() {
        return Ok(if has_image_extension(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && has_image_extension(p))
        .collect();

    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| is_image_extension(&ext.to_string_lossy()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::capture_many;
    use listing_ai_common::ImageOrigin;
    use std::fs::File;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_camera_yields_camera_images_then_cancels() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        File::create(&a).unwrap().write_all(b"dummy").unwrap();
        File::create(&b).unwrap().write_all(b"dummy").unwrap();

        let camera = FileCamera::new(vec![a, b]);
        let images = capture_many(&camera, 10).await.unwrap();

        assert_eq!(images.len(), 2);
        assert!(images.iter().all(|img| img.origin() == ImageOrigin::Camera));
        assert!(camera.capture().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_camera_missing_file() {
        let camera = FileCamera::new(vec![PathBuf::from("/nonexistent/shot.jpg")]);
        let result = camera.capture().await;
        assert!(matches!(result, Err(ListingError::Acquisition(_))));
    }

    #[tokio::test]
    async fn test_folder_library_picks_gallery_images_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.jpg", "a.PNG", "b.jpeg", "notes.txt"] {
            File::create(dir.path().join(name)).unwrap().write_all(b"x").unwrap();
        }

        let library = FolderLibrary::new(dir.path());
        let images = library.pick_from_library(true).await.unwrap();

        assert_eq!(images.len(), 3);
        assert!(images[0].source_uri().ends_with("a.PNG"));
        assert!(images[2].source_uri().ends_with("c.jpg"));
        assert!(images.iter().all(|img| img.origin() == ImageOrigin::Gallery));

        let single = library.pick_from_library(false).await.unwrap();
        assert_eq!(single.len(), 1);
    }

    #[tokio::test]
    async fn test_folder_library_not_found() {
        let library = FolderLibrary::new("/nonexistent/library/12345");
        let result = library.pick_from_library(true).await;
        assert!(matches!(result, Err(ListingError::Acquisition(_))));
    }

    #[tokio::test]
    async fn test_folder_library_empty_is_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let library = FolderLibrary::new(dir.path());
        assert!(library.pick_from_library(true).await.unwrap().is_empty());
    }
}
