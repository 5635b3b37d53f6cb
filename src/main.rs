use clap::Parser;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use listing_ai_common::{format_price, FieldUpdate, ListingDraft};
use listing_ai_rust::capture::{capture_many, FileCamera, FolderLibrary, ImageCapture};
use listing_ai_rust::cli::{Cli, Commands, OpenTarget};
use listing_ai_rust::credential::JsonFileStore;
use listing_ai_rust::detector::ObjectDetector;
use listing_ai_rust::handoff::{
    DirectoryPhotoLibrary, FileClipboard, PromptShareSheet, SystemUrlOpener,
};
use listing_ai_rust::watermark::ImageWatermarker;
use listing_ai_rust::{
    Config, ContentGenerator, CredentialResolver, GenerationError, HandoffService, ListingError,
    ListingPipeline, Ports, Result, SaveOutcome, WatermarkProcessor,
};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Generate { camera, gallery, single, output, yes, no_watermark } => {
            println!("🛍️ listing-ai - 出品情報生成\n");

            // 1. 画像取得
            println!("[1/4] 写真を取得中...");
            let shots = camera.len();
            let mut images = capture_many(&FileCamera::new(camera), shots).await?;
            if let Some(library) = gallery {
                images.extend(FolderLibrary::new(library).pick_from_library(!single).await?);
            }
            if images.is_empty() {
                return Err(ListingError::NoImages);
            }
            let camera_count = images.iter().filter(|img| img.is_from_camera()).count();
            println!("✔ {}枚の写真 (カメラ {}枚)\n", images.len(), camera_count);

            let credentials = credential_resolver()?;
            let pipeline = build_pipeline(&config, &credentials).await?;

            // 2. 出品可否の確認（定型文方式のみ）
            println!("[2/4] 出品可否を確認中...");
            let hint = match pipeline.screen(&images).await {
                Some(screening) => {
                    println!(
                        "✔ 検出: {} ({}%)\n",
                        screening.detection.object_class,
                        screening.detection.confidence_percent()
                    );
                    if !screening.eligible && !yes {
                        let proceed = confirm(format!(
                            "「{}」はマーケットプレイス向きでない可能性があります。続行しますか?",
                            screening.detection.object_class
                        ))
                        .await?;
                        if !proceed {
                            println!("中止しました");
                            return Ok(());
                        }
                    }
                    Some(screening.detection)
                }
                None => {
                    println!("- AI方式のためスキップ\n");
                    None
                }
            };

            // 3. 生成
            println!("[3/4] 出品情報を生成中... ({})", pipeline.strategy());
            let mut draft = pipeline
                .generate_draft(images, hint.as_ref())
                .await
                .inspect_err(|e| {
                    if let ListingError::Generation(g) = e {
                        if g.is_retryable() {
                            eprintln!("もう一度実行すると成功する可能性があります");
                        }
                    }
                })?;
            println!("✔ 生成完了\n");

            // 4. 透かし
            if no_watermark {
                println!("[4/4] 透かし処理をスキップ\n");
            } else {
                println!("[4/4] 透かし処理中...");
                let progress = ProgressBar::new(draft.images().len() as u64);
                progress.set_style(progress_style());
                pipeline
                    .watermark_with_progress(&mut draft, |done, _| progress.set_position(done as u64))
                    .await?;
                progress.finish_and_clear();
                let stamped = draft.images().iter().filter(|img| img.is_watermarked()).count();
                println!("✔ {}/{}枚に透かしを付与\n", stamped, camera_count);
            }

            save_draft(&output, &draft)?;
            print_draft(&draft, &config.currency_symbol);
            println!("\n✔ 下書きを保存: {}", output.display());
        }

        Commands::Show { input } => {
            let draft = load_draft(&input)?;
            print_draft(&draft, &config.currency_symbol);
            print_violations(&draft);
        }

        Commands::Edit { input, set, remove_image, regenerate, output } => {
            let mut draft = load_draft(&input)?;

            if let Some(index) = remove_image {
                let removed = draft.remove_image(index)?;
                println!("✔ 画像を削除: {}", removed.source_uri());
            }

            if regenerate {
                let credentials = credential_resolver()?;
                let pipeline = build_pipeline(&config, &credentials).await?;
                println!("- 生成し直しています... ({})", pipeline.strategy());
                draft = pipeline.regenerate(&draft).await?;
                println!("✔ 再生成完了");
            }

            for assignment in set {
                match draft.update_field(assignment.field, &assignment.value) {
                    FieldUpdate::Accepted => println!("✔ {} を更新", assignment.field),
                    FieldUpdate::Adjusted => println!(
                        "✔ {} を更新（補正後: {}）",
                        assignment.field,
                        draft.field_value(assignment.field)
                    ),
                }
            }

            let output = output.unwrap_or(input);
            save_draft(&output, &draft)?;
            print_draft(&draft, &config.currency_symbol);
            print_violations(&draft);
        }

        Commands::Copy { input, field } => {
            let draft = load_draft(&input)?;
            let mut handoff = handoff_service(&config)?;
            let notice = handoff.copy_field(&draft, field).await?;
            println!("{}", notice);
            println!("  進捗: {}%", handoff.completion_percentage());
        }

        Commands::SavePhotos { input } => {
            let draft = load_draft(&input)?;
            let mut handoff = handoff_service(&config)?;
            match handoff.save_images(&draft).await? {
                SaveOutcome::Saved { saved, failed } => {
                    println!("{}", listing_ai_common::handoff::PHOTO_SAVED_NOTICE);
                    println!("  保存 {}枚 / 失敗 {}枚", saved, failed);
                }
                SaveOutcome::NothingToSave => println!("保存するカメラ写真がありません"),
            }
        }

        Commands::Post { input } => {
            let draft = load_draft(&input)?;
            let mut handoff = handoff_service(&config)?;

            match handoff.post_to_marketplace(&draft).await {
                Ok(true) => {
                    println!("📋 出品情報をコピーしました");
                    println!("  📝 {}", draft.title());
                    println!("  💰 {}{}", config.currency_symbol, format_price(draft.price()));
                    println!("貼り付けて写真をアップロードしてください");
                }
                Ok(false) => println!("共有をキャンセルしました（出品情報はコピー済みです）"),
                Err(ListingError::Validation(first)) => {
                    print_violations(&draft);
                    return Err(first.into());
                }
                Err(e) => return Err(e),
            }
        }

        Commands::Share { input, detailed } => {
            let draft = load_draft(&input)?;
            let handoff = handoff_service(&config)?;
            if detailed {
                handoff.save_draft_text(&draft).await?;
                println!("✔ 詳細をクリップボードにコピーしました");
            } else if handoff.share_listing(&draft).await? {
                println!("✔ 共有しました");
            } else {
                println!("共有をキャンセルしました");
            }
        }

        Commands::Open { target } => {
            let handoff = handoff_service(&config)?;
            let opened = match target {
                OpenTarget::AppStore => handoff.open_app_store().await,
                OpenTarget::Website => handoff.open_website().await,
            };
            if !opened {
                return Err(ListingError::Handoff("開けるリンクがありません".into()));
            }
        }

        Commands::Config { set_api_key, clear_api_key, show, test } => {
            let credentials = credential_resolver()?;

            if let Some(key) = set_api_key {
                credentials.set(&key).await?;
                println!("✔ APIキーを設定しました");
            }

            if clear_api_key {
                credentials.clear().await?;
                println!("✔ APIキーを削除しました");
            }

            if show {
                println!("設定:");
                println!("  モデル: {} (1枚: {})", config.model, config.single_image_model);
                println!("  エンドポイント: {}", config.endpoint);
                println!("  通貨: {} ({})", config.currency, config.currency_symbol);
                println!("  透かし: 最大{}px / 品質{}", config.watermark_width, config.watermark_quality);
                println!("  写真の保存先: {}", config.gallery_dir()?.display());
                println!("  APIキー: {}", credentials.source().await);
            }

            if test {
                let generator =
                    ContentGenerator::select(&config, &credentials, ObjectDetector::default()).await?;
                match generator {
                    ContentGenerator::Ai(ai) => {
                        if ai.test_connection().await {
                            println!("✔ 接続できました");
                        } else {
                            println!("✖ 接続できませんでした");
                        }
                    }
                    ContentGenerator::Template(_) => {
                        return Err(GenerationError::MissingCredential.into());
                    }
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn progress_style() -> ProgressStyle {
    match ProgressStyle::default_bar().template("{bar:30.green/white} {pos}/{len} {msg}") {
        Ok(style) => style.progress_chars("##-"),
        Err(_) => ProgressStyle::default_bar(),
    }
}

fn credential_resolver() -> Result<CredentialResolver> {
    Ok(CredentialResolver::new(JsonFileStore::new(Config::store_path()?)))
}

async fn build_pipeline(config: &Config, credentials: &CredentialResolver) -> Result<ListingPipeline> {
    let generator = ContentGenerator::select(config, credentials, ObjectDetector::default()).await?;
    let watermark = WatermarkProcessor::new(ImageWatermarker::from_config(config)?);
    Ok(ListingPipeline::new(generator, watermark))
}

fn handoff_service(config: &Config) -> Result<HandoffService> {
    let clipboard = FileClipboard::new(Config::cache_dir()?.join("clipboard.txt"));
    println!("(クリップボード: {})", clipboard.path().display());

    let ports = Ports {
        clipboard: Box::new(clipboard),
        photos: Box::new(DirectoryPhotoLibrary::new(config.gallery_dir()?)),
        urls: Box::new(SystemUrlOpener),
        share: Box::new(PromptShareSheet),
    };
    Ok(HandoffService::new(ports, config.currency_symbol.clone()))
}

async fn confirm(prompt: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || Confirm::new().with_prompt(prompt).default(false).interact())
        .await
        .map_err(std::io::Error::other)?
        .map_err(|e| ListingError::Io(std::io::Error::other(e)))
}

fn load_draft(path: &Path) -> Result<ListingDraft> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn save_draft(path: &Path, draft: &ListingDraft) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(draft)?)?;
    Ok(())
}

fn print_draft(draft: &ListingDraft, currency_symbol: &str) {
    println!("📝 {}", draft.title());
    println!(
        "💰 {}{} (提案: {}{}, 差額 {:+})",
        currency_symbol,
        format_price(draft.price()),
        currency_symbol,
        format_price(draft.suggested_price()),
        draft.price_delta()
    );
    println!("📦 {} / 🏷️ {}", draft.condition().label(), draft.category());
    println!("\n{}\n", draft.description());
    if !draft.tags().is_empty() {
        println!("タグ: {}", draft.tags().join(", "));
    }
    for (i, image) in draft.images().iter().enumerate() {
        let mark = if image.is_watermarked() { "✓透かし" } else { "" };
        println!("  [{}] {:?} {} {}", i, image.origin(), image.preferred_uri(), mark);
    }
}

fn print_violations(draft: &ListingDraft) {
    for violation in draft.violations() {
        eprintln!("⚠ {}", violation);
    }
}
