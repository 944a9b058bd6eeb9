use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use {
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    tokio::sync::Mutex,
    tracing::debug,
};

use gymflow_config::WhatsAppAccountConfig;

use crate::error::{Error, Result};

/// Minimum remaining validity a token must have to be handed out.
const REFRESH_SKEW: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct CachedAccessToken {
    pub token: Secret<String>,
    pub expires_at: Instant,
}

impl CachedAccessToken {
    fn is_valid(&self) -> bool {
        self.expires_at > Instant::now() + REFRESH_SKEW
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

/// Caches the platform bearer token and refreshes it on demand.
///
/// The cache lock is held across the refresh, so concurrent dispatches that
/// both observe an expired token share a single in-flight refresh instead of
/// issuing duplicates.
pub struct TokenManager {
    http: reqwest::Client,
    config: Arc<WhatsAppAccountConfig>,
    cache: Mutex<Option<CachedAccessToken>>,
}

impl TokenManager {
    pub fn new(http: reqwest::Client, config: Arc<WhatsAppAccountConfig>) -> Self {
        Self {
            http,
            config,
            cache: Mutex::new(None),
        }
    }

    /// Returns the cached token, refreshing first when it is missing or has
    /// less than the refresh skew of validity left.
    pub async fn token(&self) -> Result<Secret<String>> {
        let mut guard = self.cache.lock().await;
        if let Some(token) = guard.as_ref()
            && token.is_valid()
        {
            return Ok(token.token.clone());
        }

        let refreshed = self.refresh().await?;
        let token = refreshed.token.clone();
        *guard = Some(refreshed);
        Ok(token)
    }

    async fn refresh(&self) -> Result<CachedAccessToken> {
        let url = format!("{}/auth/token", self.config.api_base.trim_end_matches('/'));
        let resp = self
            .http
            .get(url)
            .header("x-api-key", self.config.api_key.expose_secret())
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::credential(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| Error::credential(format!("malformed token response: {e}")))?;
        let ttl = body.expires_in.unwrap_or(3600).max(120);
        debug!(ttl, "refreshed platform access token");

        Ok(CachedAccessToken {
            token: Secret::new(body.access_token),
            expires_at: Instant::now() + Duration::from_secs(ttl),
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(api_base: String) -> Arc<WhatsAppAccountConfig> {
        Arc::new(WhatsAppAccountConfig {
            api_base,
            api_key: Secret::new("test-key".into()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn reuses_cached_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/auth/token")
            .match_header("x-api-key", "test-key")
            .with_status(200)
            .with_body(r#"{"access_token": "tok-1", "expires_in": 3600}"#)
            .expect(1)
            .create_async()
            .await;

        let manager = TokenManager::new(reqwest::Client::new(), test_config(server.url()));
        let first = manager.token().await.unwrap();
        let second = manager.token().await.unwrap();

        assert_eq!(first.expose_secret(), "tok-1");
        assert_eq!(second.expose_secret(), "tok-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn refreshes_expired_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/auth/token")
            .with_status(200)
            .with_body(r#"{"access_token": "tok-fresh", "expires_in": 3600}"#)
            .expect(1)
            .create_async()
            .await;

        let manager = TokenManager::new(reqwest::Client::new(), test_config(server.url()));
        // Seed the cache with a token already past its expiry.
        {
            let mut guard = manager.cache.lock().await;
            *guard = Some(CachedAccessToken {
                token: Secret::new("tok-stale".into()),
                expires_at: Instant::now() - Duration::from_secs(1),
            });
        }

        let token = manager.token().await.unwrap();
        assert_eq!(token.expose_secret(), "tok-fresh");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn token_inside_skew_is_refreshed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/auth/token")
            .with_status(200)
            .with_body(r#"{"access_token": "tok-fresh", "expires_in": 3600}"#)
            .expect(1)
            .create_async()
            .await;

        let manager = TokenManager::new(reqwest::Client::new(), test_config(server.url()));
        // Nominally unexpired, but inside the 60s refresh skew.
        {
            let mut guard = manager.cache.lock().await;
            *guard = Some(CachedAccessToken {
                token: Secret::new("tok-stale".into()),
                expires_at: Instant::now() + Duration::from_secs(10),
            });
        }

        let token = manager.token().await.unwrap();
        assert_eq!(token.expose_secret(), "tok-fresh");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/auth/token")
            .with_status(200)
            .with_body(r#"{"access_token": "tok-1", "expires_in": 3600}"#)
            .expect(1)
            .create_async()
            .await;

        let manager = Arc::new(TokenManager::new(
            reqwest::Client::new(),
            test_config(server.url()),
        ));
        let (a, b) = tokio::join!(manager.token(), manager.token());

        assert_eq!(a.unwrap().expose_secret(), "tok-1");
        assert_eq!(b.unwrap().expose_secret(), "tok-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_2xx_refresh_is_a_credential_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/auth/token")
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let manager = TokenManager::new(reqwest::Client::new(), test_config(server.url()));
        let err = manager.token().await.unwrap_err();
        assert!(matches!(err, Error::Credential { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn malformed_body_is_a_credential_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/auth/token")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let manager = TokenManager::new(reqwest::Client::new(), test_config(server.url()));
        let err = manager.token().await.unwrap_err();
        assert!(matches!(err, Error::Credential { .. }), "got {err:?}");
    }
}
