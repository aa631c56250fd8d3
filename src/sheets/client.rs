// ABOUTME: HTTP client for the Google Sheets v4 values API
// ABOUTME: Implements batchGet / batchClear for the Spreadsheet trait

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::auth::{ServiceAccountKey, SHEETS_SCOPE};
use super::{qualify_range, CellGrid, Spreadsheet};

/// Default Google Sheets API base URL
pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com";

/// Google Sheets client bound to one spreadsheet.
pub struct SheetsClient {
    client: Client,
    api_base_url: String,
    spreadsheet_id: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetResponse {
    #[serde(default)]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    range: String,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
struct BatchClearRequest<'a> {
    ranges: &'a [String],
}

impl SheetsClient {
    /// Create a client from an already obtained access token.
    ///
    /// # Arguments
    ///
    /// * `api_base_url` - Optional base URL (defaults to https://sheets.googleapis.com)
    /// * `spreadsheet_id` - Id of the spreadsheet every call targets
    /// * `access_token` - OAuth bearer token with the spreadsheets scope
    pub fn new(
        api_base_url: Option<&str>,
        spreadsheet_id: String,
        access_token: String,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_base_url: api_base_url
                .unwrap_or(DEFAULT_SHEETS_API_URL)
                .trim_end_matches('/')
                .to_string(),
            spreadsheet_id,
            access_token,
        })
    }

    /// Authenticate with a service-account key file and bind to a spreadsheet.
    ///
    /// Fails if the key cannot be read or the token exchange is rejected, so a
    /// returned client is always usable.
    pub async fn connect(credentials_path: &Path, spreadsheet_id: String) -> Result<Self> {
        let key = ServiceAccountKey::from_file(credentials_path)?;
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        let token = key.fetch_access_token(&http, SHEETS_SCOPE).await?;
        tracing::info!(
            "Authenticated to Google Sheets as {}",
            key.client_email
        );
        Self::new(None, spreadsheet_id, token.access_token)
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn values_url(&self, action: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values:{}",
            self.api_base_url, self.spreadsheet_id, action
        )
    }

    async fn batch_get_raw(
        &self,
        ranges: &[String],
        major_dimension: &str,
    ) -> Result<Vec<ValueRange>> {
        let range_params: Vec<(&str, &str)> =
            ranges.iter().map(|r| ("ranges", r.as_str())).collect();

        let response = self
            .client
            .get(self.values_url("batchGet"))
            .bearer_auth(&self.access_token)
            .query(&[("majorDimension", major_dimension)])
            .query(&range_params)
            .send()
            .await
            .context("Failed to send batchGet request to Google Sheets")?;

        let response = check_status(response, "batchGet").await?;
        let body: BatchGetResponse = response
            .json()
            .await
            .context("Failed to parse batchGet response")?;

        if body.value_ranges.len() != ranges.len() {
            bail!(
                "Google Sheets returned {} value ranges for {} requested",
                body.value_ranges.len(),
                ranges.len()
            );
        }

        Ok(body.value_ranges)
    }
}

#[async_trait]
impl Spreadsheet for SheetsClient {
    async fn column_values(&self, sheet: &str, range: &str) -> Result<Vec<String>> {
        let qualified = vec![qualify_range(sheet, range)];
        let mut value_ranges = self.batch_get_raw(&qualified, "COLUMNS").await?;
        let column = value_ranges
            .pop()
            .and_then(|vr| vr.values.into_iter().next())
            .unwrap_or_default();
        Ok(column.iter().map(cell_to_string).collect())
    }

    async fn batch_get(&self, sheet: &str, ranges: &[String]) -> Result<Vec<CellGrid>> {
        let qualified: Vec<String> = ranges.iter().map(|r| qualify_range(sheet, r)).collect();
        let value_ranges = self.batch_get_raw(&qualified, "ROWS").await?;

        Ok(value_ranges
            .into_iter()
            .map(|vr| {
                tracing::trace!("Fetched {} rows for {}", vr.values.len(), vr.range);
                to_grid(vr.values)
            })
            .collect())
    }

    async fn batch_clear(&self, sheet: &str, ranges: &[String]) -> Result<()> {
        let qualified: Vec<String> = ranges.iter().map(|r| qualify_range(sheet, r)).collect();

        let response = self
            .client
            .post(self.values_url("batchClear"))
            .bearer_auth(&self.access_token)
            .json(&BatchClearRequest {
                ranges: &qualified,
            })
            .send()
            .await
            .context("Failed to send batchClear request to Google Sheets")?;

        check_status(response, "batchClear").await?;
        Ok(())
    }
}

async fn check_status(response: Response, action: &str) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        bail!(
            "Google Sheets rejected {} ({}). Check that the service account has been \
             shared on the spreadsheet and that the credentials are valid: {}",
            action,
            status,
            body
        );
    }

    bail!("Google Sheets {} failed with status {}: {}", action, status, body)
}

/// Render a JSON cell as the string a sheet would display.
fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn to_grid(values: Vec<Vec<serde_json::Value>>) -> CellGrid {
    values
        .iter()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect()
}
