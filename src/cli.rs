use clap::{Parser, Subcommand};
use listing_ai_common::DraftField;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "listing-ai")]
#[command(about = "商品写真からマーケットプレイス出品情報を作るツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真から出品下書きを生成
    Generate {
        /// カメラで撮影した写真（複数指定可、透かし対象）
        #[arg(short, long = "camera")]
        camera: Vec<PathBuf>,

        /// ライブラリから選ぶ写真フォルダまたはファイル
        #[arg(short, long)]
        gallery: Option<PathBuf>,

        /// ライブラリからは1枚だけ選ぶ
        #[arg(long)]
        single: bool,

        /// 出力JSONファイル
        #[arg(short, long, default_value = "draft.json")]
        output: PathBuf,

        /// 出品に適さない可能性がある場合も確認せずに続行
        #[arg(short, long)]
        yes: bool,

        /// 透かし処理を行わない
        #[arg(long)]
        no_watermark: bool,
    },

    /// 下書きを表示
    Show {
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 下書きを編集
    Edit {
        #[arg(required = true)]
        input: PathBuf,

        /// フィールドを更新（例: --set price=120）
        #[arg(short, long, value_name = "FIELD=VALUE")]
        set: Vec<FieldAssignment>,

        /// 画像を削除（0始まりの番号）
        #[arg(long)]
        remove_image: Option<usize>,

        /// 残りの画像で生成し直す（編集内容は破棄）
        #[arg(long)]
        regenerate: bool,

        /// 出力先（省略時は上書き）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 1項目をクリップボードへコピー
    Copy {
        #[arg(required = true)]
        input: PathBuf,

        /// title / description / price / category / condition
        #[arg(required = true)]
        field: DraftField,
    },

    /// 写真を保存
    SavePhotos {
        #[arg(required = true)]
        input: PathBuf,
    },

    /// マーケットプレイスへ受け渡し（コピー・写真保存・アプリ起動）
    Post {
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 共有シートで共有
    Share {
        #[arg(required = true)]
        input: PathBuf,

        /// 詳細テキストをコピーするだけ（下書きの控え）
        #[arg(long)]
        detailed: bool,
    },

    /// アプリストアまたはWeb版を開く
    Open {
        /// app-store / website
        #[arg(required = true)]
        target: OpenTarget,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 保存されたAPIキーを削除
        #[arg(long)]
        clear_api_key: bool,

        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// APIへの接続を確認
        #[arg(long)]
        test: bool,
    },
}

/// --set の値
#[derive(Clone, Debug, PartialEq)]
pub struct FieldAssignment {
    pub field: DraftField,
    pub value: String,
}

impl std::str::FromStr for FieldAssignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, value) = s
            .split_once('=')
            .ok_or_else(|| format!("FIELD=VALUE の形式で指定してください: {}", s))?;
        Ok(FieldAssignment {
            field: field.trim().parse()?,
            value: value.to_string(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenTarget {
    AppStore,
    Website,
}

impl std::str::FromStr for OpenTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "app-store" | "appstore" | "store" => Ok(OpenTarget::AppStore),
            "website" | "web" => Ok(OpenTarget::Website),
            _ => Err(format!("Unknown target: {}. Use app-store or website", s)),
        }
    }
}
