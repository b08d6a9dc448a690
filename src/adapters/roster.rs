use crate::domain::model::{Roster, Student};
use crate::domain::ports::RosterProvider;
use crate::utils::error::{RollcallError, Result};
use crate::utils::validation::is_remote_source;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;

/// 從本機檔案讀名單：`.json`（`{students: [...]}` 或陣列）或有 `name` 欄位的 `.csv`
#[derive(Debug, Clone)]
pub struct FileRosterProvider {
    path: PathBuf,
}

impl FileRosterProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_csv(&self) -> bool {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    }
}

#[derive(Debug, Deserialize)]
struct CsvStudent {
    name: String,
}

fn parse_csv(data: &[u8]) -> Result<Roster> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let mut students = Vec::new();
    for row in reader.deserialize::<CsvStudent>() {
        let row = row?;
        if !row.name.is_empty() {
            students.push(Student::new(row.name));
        }
    }
    Ok(Roster { students })
}

#[async_trait]
impl RosterProvider for FileRosterProvider {
    async fn fetch_roster(&self) -> Result<Roster> {
        tracing::debug!("Reading roster from {}", self.path.display());
        let data = tokio::fs::read(&self.path).await?;

        let roster = if self.is_csv() {
            parse_csv(&data)?
        } else {
            Roster::from_value(serde_json::from_slice(&data)?)
        };
        tracing::debug!("Roster has {} students", roster.students.len());
        Ok(roster)
    }
}

#[derive(Debug, Clone)]
pub struct HttpRosterProvider {
    endpoint: String,
    client: Client,
}

impl HttpRosterProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl RosterProvider for HttpRosterProvider {
    async fn fetch_roster(&self) -> Result<Roster> {
        tracing::debug!("Requesting roster from: {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;
        tracing::debug!("Roster response status: {}", response.status());

        let body: serde_json::Value = response.error_for_status()?.json().await?;
        Ok(Roster::from_value(body))
    }
}

/// 依設定字串選擇來源
#[derive(Debug, Clone)]
pub enum RosterSource {
    File(FileRosterProvider),
    Http(HttpRosterProvider),
    Empty,
}

impl RosterSource {
    pub fn from_config(source: Option<&str>) -> Self {
        match source.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) if is_remote_source(s) => RosterSource::Http(HttpRosterProvider::new(s)),
            Some(s) => RosterSource::File(FileRosterProvider::new(s)),
            None => RosterSource::Empty,
        }
    }
}

#[async_trait]
impl RosterProvider for RosterSource {
    async fn fetch_roster(&self) -> Result<Roster> {
        match self {
            RosterSource::File(provider) => provider.fetch_roster().await,
            RosterSource::Http(provider) => provider.fetch_roster().await,
            RosterSource::Empty => Err(RollcallError::MissingConfigError {
                field: "sources.roster".to_string(),
            }),
        }
    }
}
