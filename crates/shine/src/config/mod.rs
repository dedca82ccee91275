use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Token assigned to the seeded superuser when `SHINE_ADMIN_TOKEN` is unset.
pub const DEFAULT_ADMIN_TOKEN: &str = "change-me-now";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(raw) => LogFormat::parse(&raw)?,
            Err(_) if environment == AppEnvironment::Production => LogFormat::Json,
            Err(_) => LogFormat::Compact,
        };

        let auth = AuthConfig::from_env()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            auth,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Output shape of the log lines written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat {
                value: value.to_string(),
            }),
        }
    }
}

/// Accounts allowed to call protected endpoints.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub superuser: AccountConfig,
    pub accounts: Vec<AccountConfig>,
}

/// A single bearer-token account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountConfig {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub token: String,
}

impl AuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let username = env::var("SHINE_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let email = env::var("SHINE_ADMIN_EMAIL")
            .unwrap_or_else(|_| "admin@sustainableshine.com.au".to_string());
        let token = env::var("SHINE_ADMIN_TOKEN").unwrap_or_else(|_| DEFAULT_ADMIN_TOKEN.to_string());
        if token.trim().is_empty() {
            return Err(ConfigError::EmptyToken { username });
        }

        let superuser = AccountConfig {
            username,
            email,
            first_name: String::new(),
            last_name: String::new(),
            token,
        };

        let accounts = match env::var("SHINE_ACCOUNTS") {
            Ok(raw) => parse_accounts(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            superuser,
            accounts,
        })
    }

    pub fn uses_default_admin_token(&self) -> bool {
        self.superuser.token == DEFAULT_ADMIN_TOKEN
    }

    /// Superuser first, followed by the extra accounts.
    pub fn all_accounts(&self) -> impl Iterator<Item = &AccountConfig> {
        std::iter::once(&self.superuser).chain(self.accounts.iter())
    }
}

fn parse_accounts(raw: &str) -> Result<Vec<AccountConfig>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (username, token) = entry
                .split_once(':')
                .map(|(username, token)| (username.trim(), token.trim()))
                .filter(|(username, token)| !username.is_empty() && !token.is_empty())
                .ok_or_else(|| ConfigError::InvalidAccount {
                    entry: entry.to_string(),
                })?;

            Ok(AccountConfig {
                username: username.to_string(),
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                token: token.to_string(),
            })
        })
        .collect()
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat { value: String },
    InvalidAccount { entry: String },
    EmptyToken { username: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat { value } => {
                write!(f, "APP_LOG_FORMAT '{value}' must be either compact or json")
            }
            ConfigError::InvalidAccount { entry } => {
                write!(f, "SHINE_ACCOUNTS entry '{entry}' must look like username:token")
            }
            ConfigError::EmptyToken { username } => {
                write!(f, "token for account '{username}' must not be blank")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidLogFormat { .. }
            | ConfigError::InvalidAccount { .. }
            | ConfigError::EmptyToken { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_LOG_FORMAT");
        env::remove_var("SHINE_ADMIN_USERNAME");
        env::remove_var("SHINE_ADMIN_EMAIL");
        env::remove_var("SHINE_ADMIN_TOKEN");
        env::remove_var("SHINE_ACCOUNTS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.auth.superuser.username, "admin");
        assert_eq!(config.auth.superuser.email, "admin@sustainableshine.com.au");
        assert!(config.auth.uses_default_admin_token());
        assert!(config.auth.accounts.is_empty());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8000));
        reset_env();
    }

    #[test]
    fn production_defaults_to_json_logs() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "prod");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(config.telemetry.format, LogFormat::Json);
        reset_env();
    }

    #[test]
    fn parses_extra_accounts() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SHINE_ADMIN_TOKEN", "s3cret");
        env::set_var("SHINE_ACCOUNTS", "editor:ed-token, writer:wr-token,");
        let config = AppConfig::load().expect("config loads");
        assert!(!config.auth.uses_default_admin_token());
        let usernames: Vec<_> = config
            .auth
            .all_accounts()
            .map(|account| account.username.as_str())
            .collect();
        assert_eq!(usernames, vec!["admin", "editor", "writer"]);
        assert_eq!(config.auth.accounts[1].token, "wr-token");
        reset_env();
    }

    #[test]
    fn rejects_malformed_account_entries() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SHINE_ACCOUNTS", "editor");
        match AppConfig::load() {
            Err(ConfigError::InvalidAccount { entry }) => assert_eq!(entry, "editor"),
            other => panic!("expected invalid account error, got {other:?}"),
        }
        reset_env();
    }
}
