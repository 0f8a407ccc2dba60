use crate::ops::OpError;
use crate::types::constants::ENV_API_URL;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

/// REST collaborator client: JSON request/response bodies against a
/// configured base URL, with an optional bearer token.
///
/// Failures are classified into the ops error taxonomy, so the default
/// retry policy never retries 4xx responses.
pub struct ApiClient {
    base_url: String,
    token: RwLock<Option<String>>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: RwLock::new(None),
            http: reqwest::Client::new(),
        }
    }

    /// Reads the base URL from `FLEET_API_URL`.
    pub fn from_env() -> Result<Self, OpError> {
        let base_url = std::env::var(ENV_API_URL)
            .map_err(|_| OpError::unknown(format!("{ENV_API_URL} is not set")))?;
        Ok(Self::new(base_url))
    }

    /// Replaces the bearer token attached to subsequent requests.
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, OpError> {
        let request = self.http.get(self.url(path));
        self.send(request).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, OpError> {
        let request = self.http.post(self.url(path)).json(body);
        self.send(request).await
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send<T: DeserializeOwned>(
        &self,
        mut request: reqwest::RequestBuilder,
    ) -> Result<T, OpError> {
        {
            let token = self.token.read().await;
            if let Some(token) = token.as_deref() {
                request = request.bearer_auth(token);
            }
        }

        let response = request.send().await.map_err(OpError::from)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "API request failed");
            return Err(OpError::from_status(
                status.as_u16(),
                if body.is_empty() {
                    format!("request failed with status {status}")
                } else {
                    body
                },
            ));
        }

        response.json::<T>().await.map_err(OpError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:8080/api/");
        assert_eq!(client.url("/uavs"), "http://localhost:8080/api/uavs");
        assert_eq!(client.url("uavs/1"), "http://localhost:8080/api/uavs/1");
    }
}
