//! Block transport
//!
//! [`BlockWriter`] ships one encoded `Native` block to a table. The sink owns
//! batching and retry; a writer makes exactly one attempt per call.

use async_trait::async_trait;
use bytes::Bytes;

use super::config::ClickHouseConfig;
use super::error::ClickHouseSinkError;

/// Destination for encoded blocks
#[async_trait]
pub trait BlockWriter: Send + Sync {
    /// Insert one `Native` body into `table`
    async fn write(&self, table: &str, body: Bytes) -> Result<(), ClickHouseSinkError>;
}

/// `INSERT` statement for a `Native` body
pub fn insert_query(table: &str) -> String {
    format!("INSERT INTO {table} FORMAT Native")
}

/// Writer for the ClickHouse HTTP interface
#[derive(Debug, Clone)]
pub struct HttpBlockWriter {
    client: reqwest::Client,
    endpoint: String,
    database: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpBlockWriter {
    /// Build the HTTP client from the sink configuration
    pub fn new(config: &ClickHouseConfig) -> Result<Self, ClickHouseSinkError> {
        let client = reqwest::Client::builder()
            .timeout(config.connection_timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/", config.url.trim_end_matches('/')),
            database: config.database.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }
}

#[async_trait]
impl BlockWriter for HttpBlockWriter {
    async fn write(&self, table: &str, body: Bytes) -> Result<(), ClickHouseSinkError> {
        let query = insert_query(table);
        let mut request = self
            .client
            .post(&self.endpoint)
            .query(&[("database", self.database.as_str()), ("query", query.as_str())]);

        if let Some(ref username) = self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let response = request
            .header("Content-Type", "application/octet-stream")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ClickHouseSinkError::Server {
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}
