/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, session attribute / logout 設定, session store など)
 * - 設定値のバリデーション (blank なら起動失敗)
 */
use std::env::{self, VarError};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;

pub const ENV_SESSION_ATTR_NAME: &str = "SESSION_ATTR_NAME_AUTHENTICATED_RESOURCE_ID";
pub const ENV_LOGGED_OUT_URL: &str = "LOGGED_OUT_URL";
pub const ENV_REQ_PARAM_NAME_LOGGED_OUT_URL: &str = "REQ_PARAM_NAME_LOGGED_OUT_URL";

pub const DEFAULT_SESSION_ATTR_NAME: &str = "authenticated.resource.id";
pub const DEFAULT_LOGGED_OUT_URL: &str = "/logged-out.html";
pub const DEFAULT_REQ_PARAM_NAME_LOGGED_OUT_URL: &str = "loggedOutUrl";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Blank(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Blank(key) => write!(f, "configuration cannot be blank: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings of the session authentication filter and logout endpoint.
///
/// Immutable once built; every value is trimmed and must be non-blank.
#[derive(Debug, Clone)]
pub struct SessionAuthConfig {
    session_attr_name_authenticated_resource_id: String,
    logged_out_location: HeaderValue,
    req_param_name_logged_out_url: String,
}

impl SessionAuthConfig {
    pub fn new(
        session_attr_name_authenticated_resource_id: &str,
        logged_out_url: &str,
        req_param_name_logged_out_url: &str,
    ) -> Result<Self, ConfigError> {
        let session_attr_name_authenticated_resource_id =
            non_blank(ENV_SESSION_ATTR_NAME, session_attr_name_authenticated_resource_id)?;
        let logged_out_url = non_blank(ENV_LOGGED_OUT_URL, logged_out_url)?;
        let req_param_name_logged_out_url = non_blank(
            ENV_REQ_PARAM_NAME_LOGGED_OUT_URL,
            req_param_name_logged_out_url,
        )?;

        // Must be usable as-is in a Location header.
        let logged_out_location = HeaderValue::from_str(&logged_out_url)
            .map_err(|_| ConfigError::Invalid(ENV_LOGGED_OUT_URL))?;

        Ok(Self {
            session_attr_name_authenticated_resource_id,
            logged_out_location,
            req_param_name_logged_out_url,
        })
    }

    /// Name of the session attribute holding the authenticated resource id.
    /// Other components store the identity under this name.
    pub fn authenticated_resource_id(&self) -> &str {
        &self.session_attr_name_authenticated_resource_id
    }

    pub fn logged_out_location(&self) -> &HeaderValue {
        &self.logged_out_location
    }

    pub fn req_param_name_logged_out_url(&self) -> &str {
        &self.req_param_name_logged_out_url
    }
}

fn non_blank(key: &'static str, value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::Blank(key));
    }
    Ok(value.to_string())
}

// Unset → default. Set but blank → fatal.
fn var_or(key: &'static str, default: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) => non_blank(key, &value),
        Err(VarError::NotPresent) => Ok(default.to_string()),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::Invalid(key)),
    }
}

fn parsed_var_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => non_blank(key, &value)?
            .parse()
            .map_err(|_| ConfigError::Invalid(key)),
        Err(VarError::NotPresent) => Ok(default),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::Invalid(key)),
    }
}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub session_auth: SessionAuthConfig,
    pub default_resource_id: i64,

    pub session_cookie_name: String,
    pub session_ttl: Duration,
    // redis://... selects the Valkey store; unset keeps sessions in memory
    pub session_store_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = parsed_var_or("PORT", 3000)?;

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let session_auth = SessionAuthConfig::new(
            &var_or(ENV_SESSION_ATTR_NAME, DEFAULT_SESSION_ATTR_NAME)?,
            &var_or(ENV_LOGGED_OUT_URL, DEFAULT_LOGGED_OUT_URL)?,
            &var_or(
                ENV_REQ_PARAM_NAME_LOGGED_OUT_URL,
                DEFAULT_REQ_PARAM_NAME_LOGGED_OUT_URL,
            )?,
        )?;

        let default_resource_id: i64 = parsed_var_or("DEFAULT_RESOURCE_ID", 0)?;

        let session_cookie_name = var_or("SESSION_COOKIE_NAME", "SESSION")?;

        let session_ttl_seconds: u64 = parsed_var_or("SESSION_TTL_SECONDS", 1800)?;
        if session_ttl_seconds == 0 {
            return Err(ConfigError::Invalid("SESSION_TTL_SECONDS"));
        }

        let session_store_url = match env::var("SESSION_STORE_URL") {
            Ok(url) => Some(non_blank("SESSION_STORE_URL", &url)?),
            Err(VarError::NotPresent) => None,
            Err(VarError::NotUnicode(_)) => return Err(ConfigError::Invalid("SESSION_STORE_URL")),
        };

        Ok(Self {
            addr,
            app_env,
            session_auth,
            default_resource_id,
            session_cookie_name,
            session_ttl: Duration::from_secs(session_ttl_seconds),
            session_store_url,
        })
    }
}
