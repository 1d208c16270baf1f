//! 欄位プロファイルモジュール
//!
//! 3種類のアプリ（西藥検索・冰庫/写真辨識・中藥）の違いを
//! 見出し同義語テーブルとして表現する。テーブルはデータであり、
//! 各フィールドは左から最初に一致した見出しセルが採用される。

use serde::{Deserialize, Serialize};

/// 見出し行判定に使うマーカー文字（儲位・名稱・藥名の「位」「名」「藥」）
pub const HEADER_MARKERS: &[char] = &['位', '名', '藥'];

/// 1種類のアプリの欄位定義
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnProfile {
    pub location: &'static [&'static str],
    pub name: &'static [&'static str],
    pub english_name: &'static [&'static str],
    pub scientific_name: &'static [&'static str],
    pub specification: &'static [&'static str],
    /// 類別列の同義語（空なら列なし）
    pub category: &'static [&'static str],
    /// 備註列の同義語（空なら列なし）
    pub note: &'static [&'static str],
    pub header_markers: &'static [char],
    /// 冰庫判定キーワード（小文字）
    pub refrigeration_keywords: &'static [&'static str],
}

const WESTERN: ColumnProfile = ColumnProfile {
    location: &["儲位", "櫃", "位置", "loc", "place", "櫃號", "棚", "位"],
    name: &["中文", "名稱", "藥名", "品名", "商品名", "name", "drug", "商品名稱"],
    english_name: &["英文", "eng", "english", "英文名"],
    scientific_name: &["學名", "成分", "成份", "generic", "scientific"],
    specification: &["規格", "劑量", "包裝", "容量", "spec", "strength"],
    category: &[],
    note: &[],
    header_markers: HEADER_MARKERS,
    refrigeration_keywords: &["冰", "冷", "fridge", "refrig"],
};

const REFRIGERATED: ColumnProfile = ColumnProfile {
    category: &["類別", "分類", "category", "type"],
    note: &["備註", "說明", "note", "remark"],
    ..WESTERN
};

const HERBAL: ColumnProfile = ColumnProfile {
    location: &["藥斗", "斗", "儲位", "櫃", "位置", "loc", "位"],
    name: &["藥材", "飲片", "中藥", "品名", "名稱", "藥名", "name", "herb"],
    english_name: &["拼音", "pinyin", "英文", "eng", "english"],
    scientific_name: &["拉丁", "學名", "基原", "latin", "scientific"],
    specification: &["規格", "炮製", "劑量", "包裝", "spec"],
    category: &["類別", "分類", "category"],
    note: &["備註", "說明", "note"],
    header_markers: HEADER_MARKERS,
    refrigeration_keywords: &["冷藏", "冰"],
};

/// アプリの種類
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// 西藥儲位検索（デフォルト）
    #[default]
    Western,
    /// 類別・備註列ありの冰庫対応版
    Refrigerated,
    /// 中藥版
    Herbal,
}

impl Profile {
    pub fn columns(&self) -> &'static ColumnProfile {
        match self {
            Profile::Western => &WESTERN,
            Profile::Refrigerated => &REFRIGERATED,
            Profile::Herbal => &HERBAL,
        }
    }
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "western" | "west" | "西藥" => Ok(Profile::Western),
            "refrigerated" | "fridge" | "冰庫" => Ok(Profile::Refrigerated),
            "herbal" | "tcm" | "中藥" => Ok(Profile::Herbal),
            _ => Err(format!(
                "Unknown profile: {}. Use western, refrigerated, or herbal",
                s
            )),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Profile::Western => write!(f, "western"),
            Profile::Refrigerated => write!(f, "refrigerated"),
            Profile::Herbal => write!(f, "herbal"),
        }
    }
}

impl ColumnProfile {
    /// テキストに冰庫キーワードが含まれるか
    pub fn mentions_refrigeration(&self, texts: &[&str]) -> bool {
        texts.iter().any(|text| {
            let lower = text.to_lowercase();
            self.refrigeration_keywords
                .iter()
                .any(|keyword| lower.contains(keyword))
        })
    }
}
