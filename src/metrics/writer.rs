//! InfluxDB 1.x batch writer
//!
//! One page of points is sent as a single `POST /write` request. The store
//! either accepts the whole batch or the call fails; nothing is retried here.

use crate::config::InfluxConfig;
use crate::metrics::line_protocol::encode_batch;
use crate::metrics::Point;
use crate::WriteError;
use reqwest::Client;
use url::Url;

/// Retention policy every batch is written under
pub const RETENTION_POLICY: &str = "autogen";

/// Writes batches of points into one InfluxDB database
#[derive(Debug, Clone)]
pub struct InfluxWriter {
    client: Client,
    endpoint: String,
    write_url: Url,
    database: String,
}

impl InfluxWriter {
    /// Creates a writer for the database named in `config`
    ///
    /// Credentials, when present, travel as the `u`/`p` query parameters.
    pub fn new(client: Client, config: &InfluxConfig) -> Result<Self, url::ParseError> {
        let endpoint = config.endpoint();
        let mut write_url = Url::parse(&endpoint)?.join("write")?;

        {
            let mut query = write_url.query_pairs_mut();
            query
                .append_pair("db", &config.database)
                .append_pair("rp", RETENTION_POLICY)
                .append_pair("precision", config.precision.as_str());
            if let (Some(user), Some(password)) = (&config.username, &config.password) {
                query.append_pair("u", user).append_pair("p", password);
            }
        }

        Ok(Self {
            client,
            endpoint,
            write_url,
            database: config.database.clone(),
        })
    }

    /// Store address without credentials, for logs and errors
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Writes all points in one request
    ///
    /// An empty batch is not sent. Returns the number of points written.
    pub async fn write(&self, points: &[Point]) -> Result<usize, WriteError> {
        if points.is_empty() {
            tracing::debug!("No points to write into {}, skipping", self.database);
            return Ok(0);
        }

        let response = self
            .client
            .post(self.write_url.clone())
            .body(encode_batch(points))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WriteError::Rejected {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        tracing::info!(
            "Successfully wrote {} points into {}/{}",
            points.len(),
            self.database,
            RETENTION_POLICY
        );
        Ok(points.len())
    }
}
