//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    /// BOM・空行を除いた結果、内容行が1行も残らなかった
    #[error("CSV has no content lines")]
    EmptyCsv,

    /// 全行が名稱・儲位ともに空で除外された
    #[error("CSV has no usable rows")]
    NoUsableRows,
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
