use crate::config::Config;
use anyhow::{anyhow, Result};
use chrono::Utc;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use url::Url;

/// Margin subtracted from token expiry to absorb clock skew and transit time.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Token response from the Yoto OAuth token endpoint.
/// `obtained_at` is not part of the wire response; it is stamped locally when
/// the response is received so expiry can be computed later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub obtained_at: i64,
}

impl TokenResponse {
    /// Absolute expiry as epoch seconds. Missing `expires_in` is treated as
    /// one hour, matching the server's usual grant.
    pub fn expires_at(&self) -> i64 {
        self.obtained_at + self.expires_in.unwrap_or(3600)
    }

    /// True once the token is within the skew margin of its expiry.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() + EXPIRY_SKEW_SECS >= self.expires_at()
    }
}

// Endpoint bases may be overridden by YOTO_LOGIN_BASE / YOTO_OAUTH_BASE env
// vars (useful for tests), otherwise they come from config.
fn login_base(cfg: &Config) -> String {
    env::var("YOTO_LOGIN_BASE").unwrap_or_else(|_| cfg.yoto_login_base.clone())
}

fn oauth_base(cfg: &Config) -> String {
    env::var("YOTO_OAUTH_BASE").unwrap_or_else(|_| cfg.yoto_oauth_base.clone())
}

/// Build the browser authorization URL for the auth-code + PKCE (S256) step.
pub fn build_authorize_url(
    cfg: &Config,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
    code_challenge: &str,
) -> Result<String> {
    let base = login_base(cfg);
    let mut url = Url::parse(&format!("{}/authorize", base.trim_end_matches('/')))?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("audience", &cfg.yoto_audience)
        .append_pair("scope", &cfg.scope)
        .append_pair("code_challenge", code_challenge)
        .append_pair("code_challenge_method", "S256")
        .append_pair("state", state);
    Ok(url.to_string())
}

/// Extract the `code` and `state` query params from a pasted redirect URL.
pub fn parse_redirect_params(input: &str) -> Result<(String, String)> {
    let parsed = Url::parse(input).map_err(|e| anyhow!("invalid url pasted: {}", e))?;
    let code = parsed
        .query_pairs()
        .find(|(k, _)| k == "code")
        .ok_or_else(|| anyhow!("no code in redirect URL"))?
        .1
        .into_owned();
    let state = parsed
        .query_pairs()
        .find(|(k, _)| k == "state")
        .ok_or_else(|| anyhow!("no state in redirect URL"))?
        .1
        .into_owned();
    Ok((code, state))
}

fn http_client(cfg: &Config) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(cfg.http_timeout_secs))
        .build()?;
    Ok(client)
}

/// Exchange an authorization code (plus the PKCE verifier that produced its
/// challenge) for tokens.
///
/// This is the public-client shape: the client_id travels in the form body
/// and no client secret is sent; the code_verifier is the proof.
pub async fn exchange_code_for_token(
    cfg: &Config,
    client_id: &str,
    code: &str,
    code_verifier: &str,
    redirect_uri: &str,
) -> Result<TokenResponse> {
    let url = format!("{}/oauth/token", oauth_base(cfg).trim_end_matches('/'));
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("client_id", client_id),
        ("code_verifier", code_verifier),
    ];
    debug!("exchanging authorization code at {}", url);
    let client = http_client(cfg)?;
    let resp = client.post(&url).form(&params).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        return Err(anyhow!("token exchange failed: {} => {}", status, txt));
    }
    let mut tok: TokenResponse = resp.json().await?;
    tok.obtained_at = Utc::now().timestamp();
    Ok(tok)
}

/// Refresh an access token. Yoto rotates refresh tokens, so callers must
/// replace their stored refresh token whenever the response carries a new one.
pub async fn refresh_access_token(
    cfg: &Config,
    client_id: &str,
    refresh_token: &str,
) -> Result<TokenResponse> {
    let url = format!("{}/oauth/token", oauth_base(cfg).trim_end_matches('/'));
    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("client_id", client_id),
    ];
    debug!("refreshing access token at {}", url);
    let client = http_client(cfg)?;
    let resp = client.post(&url).form(&params).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        return Err(anyhow!("token refresh failed: {} => {}", status, txt));
    }
    let mut tok: TokenResponse = resp.json().await?;
    tok.obtained_at = Utc::now().timestamp();
    Ok(tok)
}
