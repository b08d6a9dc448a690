use crate::core::links::PageLinks;
use crate::core::rollcall::{HostOptions, DEFAULT_CALLER, DEFAULT_CHANNEL, DEFAULT_STEP_MS};
use crate::core::selection::{SelectionState, DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT, MIN_RECENT_LIMIT};
use crate::utils::error::{RollcallError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_HISTORY_PATH: &str = "rollcall-store.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollcallConfig {
    pub selection: SelectionConfig,
    pub host: HostConfig,
    pub sources: SourcesConfig,
    pub history: HistoryConfig,
    pub pages: PagesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub no_repeat: bool,
    pub recent_limit: usize,
    pub pick_count: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            no_repeat: true,
            recent_limit: DEFAULT_RECENT_LIMIT,
            pick_count: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub event_channel: String,
    pub caller: String,
    pub step_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            event_channel: DEFAULT_CHANNEL.to_string(),
            caller: DEFAULT_CALLER.to_string(),
            step_ms: DEFAULT_STEP_MS,
        }
    }
}

/// 名單與座位表來源：檔案路徑或 `http(s)://` 端點
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub roster: Option<String>,
    pub seating: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub path: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_HISTORY_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    pub settings: Option<String>,
    pub external: Option<String>,
}

impl RollcallConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RollcallError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ROSTER_URL})；找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RollcallError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn selection_state(&self) -> SelectionState {
        SelectionState::new(
            self.selection.no_repeat,
            self.selection.recent_limit,
            self.selection.pick_count,
        )
    }

    pub fn host_options(&self) -> Result<HostOptions> {
        Ok(HostOptions {
            event_channel: self.host.event_channel.clone(),
            caller: self.host.caller.clone(),
            step_ms: self.host.step_ms,
            pages: PageLinks::from_paths(
                self.pages.settings.as_deref(),
                self.pages.external.as_deref(),
            )?,
        })
    }
}

impl Validate for RollcallConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_range(
            "selection.recent_limit",
            self.selection.recent_limit,
            MIN_RECENT_LIMIT,
            MAX_RECENT_LIMIT,
        )?;
        validation::validate_positive_number("selection.pick_count", self.selection.pick_count, 1)?;
        validation::validate_non_empty_string("host.event_channel", &self.host.event_channel)?;
        validation::validate_non_empty_string("host.caller", &self.host.caller)?;

        if let Some(roster) = &self.sources.roster {
            validation::validate_source("sources.roster", roster, &["json", "csv"])?;
        }
        if let Some(seating) = &self.sources.seating {
            validation::validate_source("sources.seating", seating, &["json"])?;
        }
        validation::validate_path("history.path", &self.history.path)?;

        if let Some(page) = &self.pages.settings {
            validation::validate_extension("pages.settings", page, &["html", "htm"])?;
        }
        if let Some(page) = &self.pages.external {
            validation::validate_extension("pages.external", page, &["html", "htm"])?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[selection]
no_repeat = false
recent_limit = 30
pick_count = 2

[host]
event_channel = "class-3a"

[sources]
roster = "https://school.example.com/students"
seating = "./seating.json"

[history]
path = "./data/store.json"

[pages]
settings = "float/settings.html"
"#;

        let config = RollcallConfig::from_toml_str(toml_content).unwrap();

        assert!(!config.selection.no_repeat);
        assert_eq!(config.selection.recent_limit, 30);
        assert_eq!(config.selection.pick_count, 2);
        assert_eq!(config.host.event_channel, "class-3a");
        assert_eq!(config.host.caller, DEFAULT_CALLER);
        assert_eq!(config.host.step_ms, 40);
        assert_eq!(config.history.path, "./data/store.json");
        assert!(config.validate().is_ok());

        let state = config.selection_state();
        assert!(!state.no_repeat());
        assert_eq!(state.recent_limit(), 30);
        assert_eq!(state.pick_count(), 2);

        let options = config.host_options().unwrap();
        assert!(options.pages.settings.is_some());
        assert!(options.pages.external.is_none());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RollcallConfig::from_toml_str("").unwrap();
        assert_eq!(config, RollcallConfig::default());
        assert!(config.selection.no_repeat);
        assert_eq!(config.selection.recent_limit, 20);
        assert_eq!(config.history.path, DEFAULT_HISTORY_PATH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ROLLCALL_TEST_ROSTER", "https://test.example.com/roster");

        let toml_content = r#"
[sources]
roster = "${ROLLCALL_TEST_ROSTER}"
seating = "${ROLLCALL_TEST_UNSET_VAR}"
"#;

        let config = RollcallConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.sources.roster.as_deref(),
            Some("https://test.example.com/roster")
        );
        assert_eq!(
            config.sources.seating.as_deref(),
            Some("${ROLLCALL_TEST_UNSET_VAR}")
        );

        std::env::remove_var("ROLLCALL_TEST_ROSTER");
    }

    #[test]
    fn test_config_validation() {
        let invalid = [
            "[selection]\nrecent_limit = 0",
            "[selection]\nrecent_limit = 101",
            "[selection]\npick_count = 0",
            "[host]\nevent_channel = \" \"",
            "[sources]\nroster = \"students.txt\"",
            "[sources]\nseating = \"seating.csv\"",
            "[pages]\nsettings = \"settings.png\"",
        ];
        for content in invalid {
            let config = RollcallConfig::from_toml_str(content).unwrap();
            assert!(config.validate().is_err(), "expected invalid: {}", content);
        }
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = RollcallConfig::from_toml_str("[selection\nno_repeat = ").unwrap_err();
        assert!(matches!(err, RollcallError::ConfigError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[selection]\npick_count = 4\n")
            .unwrap();

        let config = RollcallConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.selection.pick_count, 4);
    }
}
