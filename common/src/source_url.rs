//! 取込元URLの正規化
//!
//! Googleスプレッドシートの編集画面・公開HTMLのURLをCSV出力用に書き換える。
//! それ以外のURLは通常のCSVエンドポイントとしてそのまま使う。

use crate::error::{Error, Result};

const SPREADSHEET_HOST: &str = "docs.google.com/spreadsheets";

/// 取込元URLをCSV取得用URLに変換
///
/// # Errors
/// 空白除去後に空文字なら `Error::Config`
pub fn normalize_source_url(raw: &str) -> Result<String> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(Error::Config("網址不能為空".into()));
    }

    if !url.contains(SPREADSHEET_HOST) {
        return Ok(url.to_string());
    }

    if let Some((base, _)) = url.split_once("/edit") {
        return Ok(format!("{}/export?format=csv", base));
    }

    if url.contains("/pubhtml") {
        return Ok(url.replacen("/pubhtml", "/pub?output=csv", 1));
    }

    if url.contains("output=csv") || url.contains("format=csv") {
        return Ok(url.to_string());
    }

    let separator = if url.contains('?') { '&' } else { '?' };
    Ok(format!("{}{}output=csv", url, separator))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "https://docs.google.com/spreadsheets/d/abc123";

    #[test]
    fn test_empty_url_is_config_error() {
        assert!(matches!(normalize_source_url(""), Err(Error::Config(_))));
        assert!(matches!(normalize_source_url("   \t"), Err(Error::Config(_))));
    }

    #[test]
    fn test_edit_view_becomes_export() {
        let url = format!("{}/edit#gid=0", SHEET);
        assert_eq!(
            normalize_source_url(&url).unwrap(),
            format!("{}/export?format=csv", SHEET)
        );

        let url = format!("{}/edit?usp=sharing", SHEET);
        assert_eq!(
            normalize_source_url(&url).unwrap(),
            format!("{}/export?format=csv", SHEET)
        );
    }

    #[test]
    fn test_pubhtml_becomes_pub_csv() {
        let url = "https://docs.google.com/spreadsheets/d/e/2PACX-1v/pubhtml";
        assert_eq!(
            normalize_source_url(url).unwrap(),
            "https://docs.google.com/spreadsheets/d/e/2PACX-1v/pub?output=csv"
        );
    }

    #[test]
    fn test_existing_csv_parameter_is_kept() {
        let url = "https://docs.google.com/spreadsheets/d/e/2PACX-1v/pub?output=csv";
        assert_eq!(normalize_source_url(url).unwrap(), url);

        let url = "https://docs.google.com/spreadsheets/d/e/2PACX-1v/pub?gid=0&format=csv";
        assert_eq!(normalize_source_url(url).unwrap(), url);
    }

    #[test]
    fn test_missing_csv_parameter_is_appended() {
        let url = "https://docs.google.com/spreadsheets/d/e/2PACX-1v/pub";
        assert_eq!(
            normalize_source_url(url).unwrap(),
            format!("{}?output=csv", url)
        );

        let url = "https://docs.google.com/spreadsheets/d/e/2PACX-1v/pub?gid=0";
        assert_eq!(
            normalize_source_url(url).unwrap(),
            format!("{}&output=csv", url)
        );
    }

    #[test]
    fn test_other_hosts_pass_through_trimmed() {
        assert_eq!(
            normalize_source_url("  https://example.com/inventory.csv \n").unwrap(),
            "https://example.com/inventory.csv"
        );
    }
}
