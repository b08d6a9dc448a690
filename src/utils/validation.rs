use crate::utils::error::{RollcallError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> RollcallError {
    RollcallError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 資料來源：`http(s)://` 開頭視為遠端端點，其餘視為本機檔案
pub fn is_remote_source(source: &str) -> bool {
    let lowered = source.trim().to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

pub fn validate_http_url(field_name: &str, url_str: &str) -> Result<()> {
    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", scheme),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }
    Ok(())
}

pub fn validate_extension(field_name: &str, path: &str, allowed_extensions: &[&str]) -> Result<()> {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| invalid(field_name, path, "File has no extension or invalid filename"))?;

    if !allowed_extensions.contains(&extension.as_str()) {
        return Err(invalid(
            field_name,
            path,
            format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        ));
    }
    Ok(())
}

/// 檢查資料來源（URL 或檔案路徑）
pub fn validate_source(field_name: &str, source: &str, allowed_extensions: &[&str]) -> Result<()> {
    if is_remote_source(source) {
        validate_http_url(field_name, source.trim())
    } else {
        validate_path(field_name, source)?;
        validate_extension(field_name, source, allowed_extensions)
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_source() {
        assert!(validate_source("sources.roster", "https://example.com/students", &["json"]).is_ok());
        assert!(validate_source("sources.roster", "http://localhost:8080/x", &["json"]).is_ok());
        assert!(validate_source("sources.roster", "./students.csv", &["json", "csv"]).is_ok());
        assert!(validate_source("sources.roster", "./students.CSV", &["json", "csv"]).is_ok());
        assert!(validate_source("sources.roster", "./students.txt", &["json", "csv"]).is_err());
        assert!(validate_source("sources.roster", "./students", &["json"]).is_err());
        assert!(validate_source("sources.roster", "", &["json"]).is_err());
        assert!(validate_source("sources.roster", "http://", &["json"]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("selection.recent_limit", 1, 1, 100).is_ok());
        assert!(validate_range("selection.recent_limit", 100, 1, 100).is_ok());
        assert!(validate_range("selection.recent_limit", 0, 1, 100).is_err());
        assert!(validate_range("selection.recent_limit", 101, 1, 100).is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("selection.pick_count", 3, 1).is_ok());
        assert!(validate_positive_number("selection.pick_count", 0, 1).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("host.event_channel", "rollcall-random").is_ok());
        assert!(validate_non_empty_string("host.event_channel", "   ").is_err());
    }
}
