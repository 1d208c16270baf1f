//! 藥品レコードの型定義
//!
//! CLIと将来のフロントエンドで共有される型:
//! - MedicationRecord: CSV取込の正規化済み出力
//! - Recognition: 写真辨識サービスの結果

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// 正規化済みの藥品レコード
///
/// `id` は取込バッチごとに振り直される。同期をまたいだ同一性の
/// キーとして使ってはならない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicationRecord {
    pub id: String,
    pub name: String,            // 中文名稱・商品名
    pub english_name: String,    // 英文名
    pub scientific_name: String, // 學名・成分
    pub specification: String,   // 規格
    pub location: String,        // 儲位
    pub is_refrigerated: bool,   // 冰庫
    pub description: String,     // 備註
    pub category: String,        // 類別
}

impl MedicationRecord {
    /// 名稱・儲位のどちらかがあれば保持対象
    pub fn is_usable(&self) -> bool {
        !self.name.is_empty() || !self.location.is_empty()
    }

    /// 小文字化済みキーワードで部分一致判定
    ///
    /// 対象は名稱・英文名・學名・規格・儲位。
    pub fn matches_lowercase(&self, keyword: &str) -> bool {
        [
            &self.name,
            &self.english_name,
            &self.scientific_name,
            &self.specification,
            &self.location,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(keyword))
    }
}

/// レコード一覧をJSON文字列に変換
pub fn records_to_json(records: &[MedicationRecord]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}

/// JSON文字列からレコード一覧を復元
pub fn records_from_json(json: &str) -> Result<Vec<MedicationRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// 写真辨識の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    /// 推定された藥名
    Identified(String),
    /// 辨識不能（サービスが NONE を返した）
    NoMatch,
}

impl Recognition {
    pub fn into_name(self) -> Option<String> {
        match self {
            Recognition::Identified(name) => Some(name),
            Recognition::NoMatch => None,
        }
    }
}
