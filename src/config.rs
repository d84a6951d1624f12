use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// OAuth client id registered with Yoto. May be left empty and supplied
    /// interactively by the auth flow.
    #[serde(default)]
    pub yoto_client_id: String,

    /// Redirect URI for the authorization-code step. Only used when it is a
    /// valid absolute http(s) URL.
    #[serde(default)]
    pub yoto_redirect_uri: Option<String>,

    // OAuth endpoints: login base serves the browser /authorize step,
    // oauth base serves /oauth/token for exchange and refresh.
    #[serde(default = "default_login_base")]
    pub yoto_login_base: String,
    #[serde(default = "default_oauth_base")]
    pub yoto_oauth_base: String,

    /// `audience` parameter sent with the authorization request.
    #[serde(default = "default_audience")]
    pub yoto_audience: String,

    #[serde(default = "default_scope")]
    pub scope: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

fn default_login_base() -> String { "https://login.yotoplay.com".into() }
fn default_oauth_base() -> String { "https://login.yotoplay.com".into() }
fn default_audience() -> String { "https://api.yotoplay.com".into() }
fn default_scope() -> String { "offline_access".into() }
fn default_log_dir() -> PathBuf { "/var/log/yoto-oauth-pkce".into() }
fn default_http_timeout() -> u64 { 30 }

impl Config {
    pub fn from_path(path: &std::path::Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&s)?;
        Ok(cfg)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            yoto_client_id: String::new(),
            yoto_redirect_uri: None,
            yoto_login_base: default_login_base(),
            yoto_oauth_base: default_oauth_base(),
            yoto_audience: default_audience(),
            scope: default_scope(),
            log_dir: default_log_dir(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}
