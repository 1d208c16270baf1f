//! 藥品儲位快速查詢
//!
//! 公開スプレッドシートのCSVを取り込み、ローカルに保存して検索する。
//! 取込ロジック本体は `pharmacy_lookup_common` にある。

pub mod cli;
pub mod config;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod recognizer;
pub mod render;
pub mod source;
pub mod store;
pub mod sync;
