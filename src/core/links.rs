use crate::utils::error::{RollcallError, Result};
use std::path::Path;
use url::Url;

/// 浮動視窗要載入的本機頁面
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub settings: Option<Url>,
    pub external: Option<Url>,
}

impl PageLinks {
    pub fn from_paths(settings: Option<&str>, external: Option<&str>) -> Result<Self> {
        Ok(Self {
            settings: settings.map(file_url).transpose()?,
            external: external.map(file_url).transpose()?,
        })
    }
}

/// 本機檔案路徑轉 `file://` URL；相對路徑以目前目錄為準
pub fn file_url(path: &str) -> Result<Url> {
    let path = Path::new(path);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    Url::from_file_path(&absolute).map_err(|_| RollcallError::ConfigError {
        message: format!("Cannot build a file URL from '{}'", absolute.display()),
    })
}

/// 設定頁：帶上目前的不重複與最近名單上限
pub fn settings_url(base: &Url, channel: &str, caller: &str, no_repeat: bool, recent_limit: usize) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("channel", channel)
        .append_pair("caller", caller)
        .append_pair("noRepeat", if no_repeat { "1" } else { "0" })
        .append_pair("recentLimit", &recent_limit.to_string());
    url
}

pub fn external_url(base: &Url, channel: &str, caller: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("channel", channel)
        .append_pair("caller", caller);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_url_carries_current_settings() {
        let base = Url::parse("file:///plugins/rollcall/float/settings.html").unwrap();
        let url = settings_url(&base, "rollcall random", "rollcall-random", false, 30);
        assert_eq!(
            url.as_str(),
            "file:///plugins/rollcall/float/settings.html?channel=rollcall+random&caller=rollcall-random&noRepeat=0&recentLimit=30"
        );
    }

    #[test]
    fn test_external_url_replaces_existing_query() {
        let base = Url::parse("file:///float/external.html?stale=1").unwrap();
        let url = external_url(&base, "rollcall-random", "rollcall-random");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("channel".to_string(), "rollcall-random".to_string()),
                ("caller".to_string(), "rollcall-random".to_string()),
            ]
        );
    }

    #[test]
    fn test_file_url_resolves_relative_paths() {
        let url = file_url("float/settings.html").unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/float/settings.html"));
    }

    #[test]
    fn test_page_links_are_optional() {
        let links = PageLinks::from_paths(None, None).unwrap();
        assert_eq!(links, PageLinks::default());
    }
}
