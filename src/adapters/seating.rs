use crate::domain::model::SeatingGrid;
use crate::domain::ports::SeatingProvider;
use crate::utils::error::{RollcallError, Result};
use crate::utils::validation::is_remote_source;
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileSeatingProvider {
    path: PathBuf,
}

impl FileSeatingProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SeatingProvider for FileSeatingProvider {
    async fn fetch_seating(&self) -> Result<SeatingGrid> {
        tracing::debug!("Reading seating config from {}", self.path.display());
        let data = tokio::fs::read(&self.path).await?;
        Ok(SeatingGrid::from_value(serde_json::from_slice(&data)?))
    }
}

#[derive(Debug, Clone)]
pub struct HttpSeatingProvider {
    endpoint: String,
    client: Client,
}

impl HttpSeatingProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl SeatingProvider for HttpSeatingProvider {
    async fn fetch_seating(&self) -> Result<SeatingGrid> {
        tracing::debug!("Requesting seating config from: {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;
        tracing::debug!("Seating response status: {}", response.status());

        let body: serde_json::Value = response.error_for_status()?.json().await?;
        Ok(SeatingGrid::from_value(body))
    }
}

#[derive(Debug, Clone)]
pub enum SeatingSource {
    File(FileSeatingProvider),
    Http(HttpSeatingProvider),
    Empty,
}

impl SeatingSource {
    pub fn from_config(source: Option<&str>) -> Self {
        match source.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) if is_remote_source(s) => SeatingSource::Http(HttpSeatingProvider::new(s)),
            Some(s) => SeatingSource::File(FileSeatingProvider::new(s)),
            None => SeatingSource::Empty,
        }
    }
}

#[async_trait]
impl SeatingProvider for SeatingSource {
    async fn fetch_seating(&self) -> Result<SeatingGrid> {
        match self {
            SeatingSource::File(provider) => provider.fetch_seating().await,
            SeatingSource::Http(provider) => provider.fetch_seating().await,
            SeatingSource::Empty => Err(RollcallError::MissingConfigError {
                field: "sources.seating".to_string(),
            }),
        }
    }
}
