use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::SheetsError;

/// Thin client over the two Sheets v4 values endpoints the store needs.
#[derive(Clone)]
pub struct SheetsHttpClient {
    http: Client,
    base_url: Url,
    access_token: SecretString,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeUpdate<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

impl SheetsHttpClient {
    pub fn new(base_url: &str, access_token: SecretString) -> Result<Self, SheetsError> {
        if access_token.expose_secret().trim().is_empty() {
            return Err(SheetsError::Config(
                "access_token cannot be empty".to_string(),
            ));
        }

        let base_url = Url::parse(base_url)
            .map_err(|err| SheetsError::Config(format!("invalid base_url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(SheetsError::Config(format!(
                "invalid base_url: {base_url}"
            )));
        }

        Ok(Self {
            http: Client::new(),
            base_url,
            access_token,
        })
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::Config(format!("invalid base_url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
        Ok(url)
    }

    /// Every populated cell of `range` as stored: formulas as their source
    /// text, numbers unrounded. Writing these back re-enters the same values.
    pub async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(spreadsheet_id, range)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "FORMULA"),
            ])
            .send()
            .await
            .map_err(|err| SheetsError::Transport(err.without_url().to_string()))?;

        let response = check_status(response).await?;
        let range = response
            .json::<ValueRange>()
            .await
            .map_err(|err| SheetsError::Malformed(err.without_url().to_string()))?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    /// Overwrites the block starting at the top-left of `range` with `rows`.
    pub async fn put_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<String>],
    ) -> Result<(), SheetsError> {
        let url = self.values_url(spreadsheet_id, range)?;
        let body = ValueRangeUpdate {
            range,
            major_dimension: "ROWS",
            values: rows,
        };
        let response = self
            .http
            .put(url)
            .bearer_auth(self.access_token.expose_secret())
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body)
            .send()
            .await
            .map_err(|err| SheetsError::Transport(err.without_url().to_string()))?;

        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<GoogleErrorResponse>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    Err(SheetsError::Api {
        status: status.as_u16(),
        message,
    })
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// A1 reference to a whole tab, quoting the name as Sheets requires.
pub fn tab_range(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

/// A1 reference to the top-left cell of a tab.
pub fn tab_origin(tab: &str) -> String {
    format!("{}!A1", tab_range(tab))
}
