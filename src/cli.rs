use clap::{Parser, Subcommand};
use pharmacy_lookup_common::Profile;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pharmacy-lookup")]
#[command(about = "藥品儲位快速查詢（雲端試算表同步・搜尋・拍照辨識）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 欄位プロファイル (western/refrigerated/herbal)、省略時は設定値
    #[arg(long, global = true)]
    pub profile: Option<Profile>,

    /// 保存先ファイル（省略時は設定値）
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 雲端試算表から同期
    Sync {
        /// 取込元URLを変更して保存してから同期
        #[arg(short, long)]
        url: Option<String>,
    },

    /// 保存済み在庫を検索
    Search {
        /// キーワード（省略時は全件）
        term: Option<String>,

        /// 検索前に同期する
        #[arg(long)]
        sync: bool,

        /// 表示件数（省略時は設定値）
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// 写真から藥名を辨識して検索
    Identify {
        /// 藥盒・標籤の写真
        #[arg(required = true)]
        image: PathBuf,

        /// 表示件数（省略時は設定値）
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 取込元URLを設定
        #[arg(long)]
        set_url: Option<String>,

        /// 既定プロファイルを設定
        #[arg(long)]
        set_profile: Option<Profile>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 保存データ管理
    Cache {
        /// 保存データを削除
        #[arg(long)]
        clear: bool,

        /// 保存データ情報を表示
        #[arg(long)]
        info: bool,
    },
}
