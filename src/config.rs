use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use config::{Environment, Map};
use serde::Serialize;

pub const SERVICE_NAME: &str = "Ultimate Trading AI v15";
pub const SERVICE_DESCRIPTION: &str =
    "AI-Powered Trading System with Delta Exchange, TradingView & Telegram";
pub const SERVICE_VERSION: &str = "15.0.0";

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_DEDUP_TTL_SECS: u64 = 300;
const DEFAULT_WEBHOOK_RATE_LIMIT: u32 = 120;

/// How the process was asked to run. Resolved once from `ENVIRONMENT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeMode {
    Development,
    Production,
}

impl RuntimeMode {
    /// Only an explicit `ENVIRONMENT=development` selects development mode.
    pub fn from_environment(raw: Option<&str>) -> Self {
        match raw {
            Some(DEFAULT_ENVIRONMENT) => RuntimeMode::Development,
            _ => RuntimeMode::Production,
        }
    }

    pub fn reload_enabled(self) -> bool {
        self == RuntimeMode::Development
    }

    pub fn default_log_filter(self) -> &'static str {
        match self {
            RuntimeMode::Development => "info,tower_http=debug,trading_gateway=debug",
            RuntimeMode::Production => "info,tower_http=info",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Name shown in logs; falls back to "development" when unset.
    pub environment: String,
    pub mode: RuntimeMode,
    pub host: IpAddr,
    pub port: u16,
    pub tradingview_passphrase: Option<String>,
    pub webhook_dedup_ttl: Duration,
    pub webhook_rate_limit_per_minute: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_map(std::env::vars())
    }

    /// Resolve settings from an explicit key/value map instead of the
    /// process environment.
    pub fn from_map<I, K, V>(vars: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source: Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into().to_lowercase(), v.into()))
            .collect();
        Self::load(Environment::default().source(Some(source)))
    }

    fn load(environment: Environment) -> Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .set_default("host", Ipv4Addr::UNSPECIFIED.to_string())?
            .set_default("port", DEFAULT_PORT as i64)?
            .set_default("webhook_dedup_ttl_secs", DEFAULT_DEDUP_TTL_SECS as i64)?
            .set_default("webhook_rate_limit_per_minute", DEFAULT_WEBHOOK_RATE_LIMIT as i64)?
            .add_source(environment)
            .build()?;

        let raw_environment = cfg
            .get_string("environment")
            .ok()
            .filter(|value| !value.is_empty());

        let host = cfg.get_string("host")?;
        let host: IpAddr = host.parse().map_err(|_| {
            config::ConfigError::Message(format!("HOST is not an IP address: {}", host))
        })?;

        let passphrase = cfg
            .get_string("tradingview_passphrase")
            .ok()
            .filter(|value| !value.is_empty());

        Ok(Self {
            environment: raw_environment
                .clone()
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            mode: RuntimeMode::from_environment(raw_environment.as_deref()),
            host,
            port: cfg.get::<u16>("port")?,
            tradingview_passphrase: passphrase,
            webhook_dedup_ttl: Duration::from_secs(cfg.get::<u64>("webhook_dedup_ttl_secs")?),
            webhook_rate_limit_per_minute: cfg.get::<u32>("webhook_rate_limit_per_minute")?,
        })
    }

    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn reload_enabled(&self) -> bool {
        self.mode.reload_enabled()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            mode: RuntimeMode::Production,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            tradingview_passphrase: None,
            webhook_dedup_ttl: Duration::from_secs(DEFAULT_DEDUP_TTL_SECS),
            webhook_rate_limit_per_minute: DEFAULT_WEBHOOK_RATE_LIMIT,
        }
    }
}
