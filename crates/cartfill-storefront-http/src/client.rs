use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use cartfill_resolve::{
    CartPort, CatalogPort, CommitReceipt, Credentials, Session, SessionPort, VariantPort,
};
use cartfill_schemas::{
    AuthFailure, CandidateProduct, PortError, Quantity, QuantityField, Variant,
};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::session_store::SessionStore;
use crate::wire::{
    BasketRequest, BasketResponse, LoginRequest, LoginResponse, SearchResponse, VariantsResponse,
};

/// Text the storefront renders when the password is wrong.
pub const WRONG_PASSWORD_MARKER: &str = "Falsch passwort";

/// Storefront JSON API client.
#[derive(Debug, Clone)]
pub struct HttpStorefront {
    base_url: Url,
    http: reqwest::Client,
    request_timeout: Duration,
    extra_query: Vec<(String, String)>,
    sessions: SessionStore,
}

impl HttpStorefront {
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        sessions: SessionStore,
        extra_query: Vec<(String, String)>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid storefront base url: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("storefront base url cannot carry a path: {base_url}");
        }
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("build storefront http client")?;
        Ok(Self {
            base_url,
            http,
            request_timeout,
            extra_query,
            sessions,
        })
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.sessions
    }

    /// Log in regardless of any persisted session and persist the new token.
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, AuthFailure> {
        let url = self
            .endpoint(&["api", "login"])
            .map_err(|e| AuthFailure::Transport(e.to_string()))?;
        let resp = self
            .http
            .post(url)
            .json(&LoginRequest {
                email: &credentials.email,
                password: &credentials.password,
            })
            .send()
            .await
            .map_err(|e| AuthFailure::Transport(format!("login request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| AuthFailure::Transport(format!("login response read failed: {e}")))?;

        if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || body.contains(WRONG_PASSWORD_MARKER)
        {
            return Err(AuthFailure::BadCredentials);
        }
        if !status.is_success() {
            return Err(AuthFailure::Transport(format!(
                "login http error status={}",
                status.as_u16()
            )));
        }

        let parsed: LoginResponse = serde_json::from_str(&body)
            .map_err(|e| AuthFailure::Transport(format!("login response decode failed: {e}")))?;
        if parsed.token.trim().is_empty() {
            return Err(AuthFailure::Transport("login returned an empty token".to_string()));
        }

        if let Err(e) = self.sessions.save(&parsed.token) {
            warn!(error = %format!("{e:#}"), "could not persist session; continuing");
        }
        info!("logged in to storefront");
        Ok(Session::new(parsed.token))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, PortError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PortError::Transport(format!("base url cannot carry a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn map_send_error(&self, op: &str, e: reqwest::Error) -> PortError {
        if e.is_timeout() {
            PortError::Timeout {
                op: op.to_string(),
                after_ms: u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            PortError::Transport(format!("{op} request failed: {e}"))
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, op: &str, resp: reqwest::Response) -> Result<T, PortError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(PortError::Rejected(format!("{op} http error status={}", status.as_u16())));
        }
        let body = resp.text().await.map_err(|e| self.map_send_error(op, e))?;
        serde_json::from_str(&body).map_err(|e| PortError::Decode(format!("{op} response: {e}")))
    }
}

#[async_trait]
impl SessionPort for HttpStorefront {
    async fn authenticate(&self, credentials: &Credentials) -> Result<Session, AuthFailure> {
        match self.sessions.load() {
            Ok(Some(stored)) => {
                info!(saved_at = %stored.saved_at_utc, "reusing persisted storefront session");
                return Ok(Session::restored(stored.token));
            }
            Ok(None) => {}
            Err(e) => warn!(error = %format!("{e:#}"), "ignoring unreadable session file"),
        }
        self.login(credentials).await
    }
}

#[async_trait]
impl CatalogPort for HttpStorefront {
    async fn search(
        &self,
        term: &str,
        session: &Session,
    ) -> Result<Vec<CandidateProduct>, PortError> {
        let url = self.endpoint(&["api", "search"])?;
        let mut query: Vec<(&str, &str)> = vec![("searchparam", term)];
        query.extend(self.extra_query.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let resp = self
            .http
            .get(url)
            .bearer_auth(session.token())
            .query(&query)
            .send()
            .await
            .map_err(|e| self.map_send_error("search", e))?;

        let body: SearchResponse = self.read_json("search", resp).await?;
        debug!(term, count = body.products.len(), "catalog search");
        Ok(body.products.into_iter().map(CandidateProduct::from).collect())
    }
}

#[async_trait]
impl VariantPort for HttpStorefront {
    async fn expand(
        &self,
        candidate: &CandidateProduct,
        session: &Session,
    ) -> Result<Vec<Variant>, PortError> {
        let url = self.endpoint(&["api", "products", candidate.id.as_str(), "variants"])?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(session.token())
            .send()
            .await
            .map_err(|e| self.map_send_error("expand", e))?;

        let body: VariantsResponse = self.read_json("expand", resp).await?;
        debug!(candidate = %candidate.id, count = body.variants.len(), "variant expansion");
        Ok(body.variants.into_iter().map(Variant::from).collect())
    }
}

#[async_trait]
impl CartPort for HttpStorefront {
    async fn commit(
        &self,
        field: &QuantityField,
        quantity: &Quantity,
        session: &Session,
    ) -> Result<CommitReceipt, PortError> {
        let url = self.endpoint(&["api", "basket"])?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(session.token())
            .json(&BasketRequest {
                quantity_field: field.as_str(),
                amount: quantity.as_str(),
            })
            .send()
            .await
            .map_err(|e| self.map_send_error("commit", e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PortError::Rejected(format!("commit http error status={}", status.as_u16())));
        }
        // body is optional
        let text = resp.text().await.unwrap_or_default();
        let body: BasketResponse = serde_json::from_str(&text).unwrap_or_default();

        Ok(CommitReceipt {
            field: field.clone(),
            quantity: quantity.clone(),
            message: body.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storefront(base: &str) -> HttpStorefront {
        HttpStorefront::new(
            base,
            Duration::from_secs(5),
            SessionStore::new("unused-session.json"),
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn endpoint_joins_under_base_path() {
        let sf = storefront("https://shop.example/shop/");
        let url = sf.endpoint(&["api", "products", "a b", "variants"]).unwrap();
        assert_eq!(url.as_str(), "https://shop.example/shop/api/products/a%20b/variants");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = HttpStorefront::new(
            "not a url",
            Duration::from_secs(1),
            SessionStore::new("s.json"),
            vec![],
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid storefront base url"));
    }
}
