use std::time::Duration;

use reqwest::Url;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Result, SourceError};

/// Thin wrapper over `reqwest::Client` with a per-source timeout and user agent.
///
/// No retries and no rate limiting: one call is one GET.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()?;
        Ok(Self { client })
    }

    pub async fn get(&self, url: &str) -> Result<String> {
        self.get_with_query(url, &[] as &[(&str, &str)]).await
    }

    pub async fn get_with_query<Q: Serialize + ?Sized>(&self, url: &str, query: &Q) -> Result<String> {
        let resp = self.client.get(url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(resp.text().await?)
    }

    pub async fn get_json<Q: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        query: &Q,
    ) -> Result<T> {
        let text = self.get_with_query(url, query).await?;
        serde_json::from_str(&text).map_err(|e| SourceError::Parse(e.to_string()))
    }
}

/// Join `path` onto `base_url`, keeping any path prefix of the base.
pub fn join_url(base_url: &str, path: &str) -> Result<Url> {
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| SourceError::Parse(format!("invalid URL {joined}: {e}")))
}
