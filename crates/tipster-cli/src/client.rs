//! Async HTTP client wrapping the Tipster JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tipster_core::{
  display::TipDisplay, ingest::IngestReport, plan::SubscriptionPlan, subscription::UserPackage,
};

/// Connection settings for the Tipster API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Body of a successful `POST /api/admin/ingest`.
#[derive(Debug, Deserialize)]
pub struct IngestSummary {
  pub message: String,
  #[serde(flatten)]
  pub report:  IngestReport,
}

/// Async HTTP client for the Tipster JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// `{base_url}/api/{segments..}` with every segment percent-encoded.
  fn segment_url(&self, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(&self.url("")).context("invalid base URL")?;
    url
      .path_segments_mut()
      .map_err(|()| anyhow!("base URL cannot carry a path"))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  /// Send `req` and decode a JSON success body, surfacing the server's
  /// `{"error": ..}` message otherwise.
  async fn send<T: DeserializeOwned>(&self, label: &str, req: RequestBuilder) -> Result<T> {
    tracing::debug!(request = label, "sending");
    let resp = self
      .auth(req)
      .send()
      .await
      .with_context(|| format!("{label} failed"))?;
    if !resp.status().is_success() {
      return Err(error_from(label, resp).await);
    }
    resp
      .json()
      .await
      .with_context(|| format!("deserialising {label} response"))
  }

  // ── Admin ─────────────────────────────────────────────────────────────────

  /// `POST /api/admin/ingest` with a raw JSON document.
  pub async fn ingest(&self, body: Vec<u8>) -> Result<IngestSummary> {
    let req = self
      .client
      .post(self.url("/admin/ingest"))
      .header(reqwest::header::CONTENT_TYPE, "application/json")
      .body(body);
    self.send("POST /admin/ingest", req).await
  }

  // ── Public ────────────────────────────────────────────────────────────────

  /// `GET /api/plans`
  pub async fn plans(&self) -> Result<Vec<SubscriptionPlan>> {
    self.send("GET /plans", self.client.get(self.url("/plans"))).await
  }

  /// `GET /api/plans/{id}/tips`
  pub async fn plan_tips(&self, plan_id: i64) -> Result<Vec<TipDisplay>> {
    let path = format!("/plans/{plan_id}/tips");
    self.send(&format!("GET {path}"), self.client.get(self.url(&path))).await
  }

  /// `GET /api/users/{email}/packages`
  pub async fn packages(&self, email: &str) -> Result<Vec<UserPackage>> {
    let url = self.segment_url(&["users", email, "packages"])?;
    self.send("GET /users/{email}/packages", self.client.get(url)).await
  }

  /// `GET /api/tips/free[?date=..]`
  pub async fn free_tips(&self, date: Option<NaiveDate>) -> Result<Vec<TipDisplay>> {
    let mut req = self.client.get(self.url("/tips/free"));
    if let Some(date) = date {
      req = req.query(&[("date", date.to_string())]);
    }
    self.send("GET /tips/free", req).await
  }
}

async fn error_from(label: &str, resp: Response) -> anyhow::Error {
  let status = resp.status();
  let message = resp
    .json::<Value>()
    .await
    .ok()
    .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned));
  match message {
    Some(m) => anyhow!("{label} → {status}: {m}"),
    None => anyhow!("{label} → {status}"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(base_url: &str) -> ApiClient {
    ApiClient::new(ApiConfig {
      base_url: base_url.into(),
      username: String::new(),
      password: String::new(),
    })
    .unwrap()
  }

  #[test]
  fn segments_are_escaped() {
    let url = client("http://localhost:8080/")
      .segment_url(&["users", "a/b?c#d@example.com", "packages"])
      .unwrap();
    assert_eq!(url.path(), "/api/users/a%2Fb%3Fc%23d@example.com/packages");
    assert_eq!(url.query(), None);
    assert_eq!(url.fragment(), None);
  }

  #[test]
  fn plain_paths_keep_the_api_prefix() {
    let c = client("http://tips.example.com");
    assert_eq!(c.url("/plans"), "http://tips.example.com/api/plans");
  }
}
