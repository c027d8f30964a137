//! ZwiftPower HTTP client.
//!
//! ZwiftPower has no public API; data is read from the JSON endpoints its own
//! web pages use, behind the Zwift single sign-on form.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::try_join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::credentials::Credentials;
use crate::error::FetchError;
use crate::metrics;

use super::types::{has_records, Rider, Team};
use super::ZwiftFetch;

/// Entry point of the single sign-on flow.
const LOGIN_PATH: &str = "ucp.php?mode=login&login=external&oauth_service=oauthzpsso";

/// Present in the final URL when the login was rejected.
const LOGIN_REJECTED_MARKER: &str = "ucp.php?mode=login";

const USER_AGENT: &str = concat!("zwift-racing-api/", env!("CARGO_PKG_VERSION"));

static FORM_ACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<form\b[^>]*?\baction\s*=\s*["']([^"']+)["']"#)
        .expect("form action regex is valid")
});

/// ZwiftPower client holding credentials and connection settings.
#[derive(Debug, Clone)]
pub struct ZwiftPowerClient {
    base_url: Url,
    credentials: Credentials,
    timeout: Duration,
}

/// An authenticated session with its own cookie jar.
#[derive(Debug)]
struct Session {
    http: reqwest::Client,
    base_url: Url,
}

impl ZwiftPowerClient {
    /// Create a client from config.
    pub fn new(config: &Config, credentials: Credentials) -> Result<Self, FetchError> {
        Self::with_base_url(&config.zwiftpower_url, credentials, config.http_timeout())
    }

    /// Create a client against an explicit base URL.
    pub fn with_base_url(
        base_url: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            credentials,
            timeout,
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Open a fresh session and sign in.
    #[instrument(skip(self), fields(username = %self.credentials.username()))]
    async fn login(&self) -> Result<Session, FetchError> {
        let start = Instant::now();

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let login_url = self.base_url.join(LOGIN_PATH)?;
        let page = http.get(login_url).send().await?;
        let page_url = page.url().clone();
        let html = page.text().await?;

        let action = extract_form_action(&html).ok_or(FetchError::LoginFormMissing)?;
        let action_url = page_url.join(&action)?;
        debug!(action = %action_url, "Submitting login form");

        let response = http
            .post(action_url)
            .form(&[
                ("username", self.credentials.username()),
                ("password", self.credentials.password()),
            ])
            .send()
            .await?;

        if response.url().as_str().contains(LOGIN_REJECTED_MARKER) {
            warn!("ZwiftPower rejected the login");
            metrics::inc_login_failures();
            return Err(FetchError::LoginFailed {
                username: self.credentials.username().to_string(),
            });
        }

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "ZwiftPower login form submission failed");
            metrics::inc_login_failures();
            return Err(FetchError::Status {
                url: response.url().to_string(),
                status: status.as_u16(),
            });
        }

        metrics::record_login_latency(start);
        debug!("Logged in to ZwiftPower");

        Ok(Session {
            http,
            base_url: self.base_url.clone(),
        })
    }
}

impl Session {
    /// Fetch one JSON document. `None` when upstream has no record.
    async fn get_document(&self, url: Url) -> Result<Option<Value>, FetchError> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!(%url, "Upstream returned 404");
            return Ok(None);
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let document: Value = serde_json::from_str(&body)
            .map_err(|e| FetchError::Parse(format!("{} returned non-JSON body: {}", url, e)))?;

        Ok(has_records(&document).then_some(document))
    }

    async fn rider(&self, zwift_id: i64) -> Result<Option<Rider>, FetchError> {
        let url = self
            .base_url
            .join(&format!("cache3/profile/{}_all.json", zwift_id))?;
        let document = self.get_document(url).await?;
        Ok(document.map(|raw| Rider::new(zwift_id, raw)))
    }

    async fn team(&self, team_id: i64) -> Result<Option<Team>, FetchError> {
        let mut url = self.base_url.join("api3.php")?;
        url.query_pairs_mut()
            .append_pair("do", "team_riders")
            .append_pair("id", &team_id.to_string());
        let document = self.get_document(url).await?;
        Ok(document.map(|raw| Team::new(team_id, raw)))
    }
}

#[async_trait]
impl ZwiftFetch for ZwiftPowerClient {
    #[instrument(skip(self))]
    async fn fetch_riders(&self, ids: &[i64]) -> Result<HashMap<i64, Rider>, FetchError> {
        let session = self.login().await?;
        let riders = try_join_all(ids.iter().map(|&id| session.rider(id))).await?;

        let found: HashMap<i64, Rider> = riders
            .into_iter()
            .flatten()
            .map(|rider| (rider.zwift_id, rider))
            .collect();

        debug!(requested = ids.len(), found = found.len(), "Fetched riders");
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn fetch_teams(&self, ids: &[i64]) -> Result<HashMap<i64, Team>, FetchError> {
        let session = self.login().await?;
        let teams = try_join_all(ids.iter().map(|&id| session.team(id))).await?;

        let found: HashMap<i64, Team> = teams
            .into_iter()
            .flatten()
            .map(|team| (team.team_id, team))
            .collect();

        debug!(requested = ids.len(), found = found.len(), "Fetched teams");
        Ok(found)
    }
}

/// First `<form action="...">` in `html`, with `&amp;` decoded.
pub fn extract_form_action(html: &str) -> Option<String> {
    FORM_ACTION
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("&amp;", "&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_form_action_decodes_entities() {
        let html = r#"
            <html><body>
            <form id="kc-form-login" onsubmit="return true;"
                  action="https://secure.zwift.com/auth/login?session_code=abc&amp;tab_id=xyz"
                  method="post">
            </form></body></html>
        "#;

        assert_eq!(
            extract_form_action(html).as_deref(),
            Some("https://secure.zwift.com/auth/login?session_code=abc&tab_id=xyz")
        );
    }

    #[test]
    fn extract_form_action_missing() {
        assert_eq!(extract_form_action("<html><p>maintenance</p></html>"), None);
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = ZwiftPowerClient::with_base_url(
            "http://localhost:1234/zp",
            Credentials::new("u", "p"),
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:1234/zp/");
        assert_eq!(
            client.base_url().join(LOGIN_PATH).unwrap().as_str(),
            "http://localhost:1234/zp/ucp.php?mode=login&login=external&oauth_service=oauthzpsso"
        );
    }

    #[test]
    fn client_creation_from_config() {
        let config = Config::default();
        let client = ZwiftPowerClient::new(&config, Credentials::new("u", "p")).unwrap();
        assert_eq!(client.base_url().as_str(), "https://zwiftpower.com/");
    }
}
