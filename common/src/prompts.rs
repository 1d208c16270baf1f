//! 写真辨識プロンプト生成モジュール
//!
//! - REFERENCE_LIMIT: 参考清單に載せる藥名の上限
//! - reference_names: 在庫から参考清單を作る
//! - build_recognition_prompt: 辨識用プロンプト

use crate::parser::NO_MATCH_REPLY;
use crate::types::MedicationRecord;

/// 参考清單に載せる藥名の上限
pub const REFERENCE_LIMIT: usize = 100;

/// 在庫の先頭から参考清單用の藥名を取り出す
pub fn reference_names(records: &[MedicationRecord]) -> Vec<&str> {
    records
        .iter()
        .take(REFERENCE_LIMIT)
        .map(|r| r.name.as_str())
        .collect()
}

/// 辨識用プロンプト生成
///
/// # Arguments
/// * `names` - 参考清單の藥名（上限を超えた分は無視）
pub fn build_recognition_prompt(names: &[&str]) -> String {
    let reference = names
        .iter()
        .take(REFERENCE_LIMIT)
        .copied()
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"你是藥學部的辨識小助手。
任務：從照片中的藥盒或標籤中提取藥品名稱關鍵字。

規則：
1. 優先回傳中文商品名，若無則回傳英文名。
2. 排除所有規格（如 500mg, 10ml）。
3. 排除廠商名（如 輝瑞, 永信）。
4. 只回傳「純文字藥名」，不要有標點符號。
5. 若無法辨識請回傳 "{NO_MATCH_REPLY}"。

參考清單：{reference}"#
    )
}
