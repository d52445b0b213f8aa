use std::{env, fmt::Display, str::FromStr, time::Duration};

use log::*;
use seatwise_engine::swe_api::throttle::DEFAULT_SPAM_THRESHOLD;
use sw_common::Secret;

const DEFAULT_SW_HOST: &str = "127.0.0.1";
const DEFAULT_SW_PORT: u16 = 8370;
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
pub const DEFAULT_USERNAME_HEADER: &str = "sw_username";
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(15 * 60);
const DEFAULT_THROTTLE_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_MAIL_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:8380";
const DEFAULT_MAIL_SENDER: &str = "no-reply@seatwise.local";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// The request header in which the identity provider passes the caller's username.
    pub username_header: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address.
    pub use_forwarded: bool,
    /// How often the auto-expiry sweep runs.
    pub sweep_interval: Duration,
    /// How long a booking may stay pending before the sweep resolves it. Zero resolves every pending booking.
    pub hold_timeout: Duration,
    pub throttle_interval: Duration,
    pub spam_threshold: i64,
    pub mail_interval: Duration,
    pub gateway: GatewayConfig,
    pub mail: MailConfig,
    /// Key used to sign card details before they are sent to the gateway.
    pub payment_hash_key: Secret<String>,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub url: String,
    pub api_key: Secret<String>,
    /// Upper bound on a whole gateway request, from connecting to reading the body.
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { url: DEFAULT_GATEWAY_URL.to_string(), api_key: Secret::default(), timeout: DEFAULT_HTTP_TIMEOUT }
    }
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    /// When not set, outgoing mail is written to the log instead of being sent.
    pub api_url: Option<String>,
    pub api_key: Secret<String>,
    pub default_sender: String,
    pub timeout: Duration,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: Secret::default(),
            default_sender: DEFAULT_MAIL_SENDER.to_string(),
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SW_HOST.to_string(),
            port: DEFAULT_SW_PORT,
            database_url: String::default(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            username_header: DEFAULT_USERNAME_HEADER.to_string(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            hold_timeout: Duration::ZERO,
            throttle_interval: DEFAULT_THROTTLE_INTERVAL,
            spam_threshold: DEFAULT_SPAM_THRESHOLD,
            mail_interval: DEFAULT_MAIL_INTERVAL,
            gateway: GatewayConfig::default(),
            mail: MailConfig::default(),
            payment_hash_key: Secret::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SW_HOST").ok().unwrap_or_else(|| DEFAULT_SW_HOST.into());
        let port = parse_env("SW_PORT", DEFAULT_SW_PORT);
        let database_url = env::var("SW_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SW_DATABASE_URL is not set. Please set it to the URL for the Seatwise database.");
            String::default()
        });
        let max_connections = parse_env("SW_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS);
        let username_header = env::var("SW_USERNAME_HEADER")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USERNAME_HEADER.to_string());
        let use_x_forwarded_for = parse_flag("SW_USE_X_FORWARDED_FOR", false);
        let use_forwarded = parse_flag("SW_USE_FORWARDED", false);
        let sweep_interval = Duration::from_secs(parse_env("SW_SWEEP_INTERVAL", DEFAULT_SWEEP_INTERVAL.as_secs()));
        let hold_timeout = Duration::from_secs(60 * parse_env::<u64>("SW_HOLD_TIMEOUT", 0));
        let throttle_interval =
            Duration::from_secs(parse_env("SW_THROTTLE_INTERVAL", DEFAULT_THROTTLE_INTERVAL.as_secs()));
        let spam_threshold = parse_env("SW_SPAM_THRESHOLD", DEFAULT_SPAM_THRESHOLD);
        let mail_interval = Duration::from_secs(parse_env("SW_MAIL_INTERVAL", DEFAULT_MAIL_INTERVAL.as_secs()));
        let gateway = GatewayConfig::from_env_or_default();
        let mail = MailConfig::from_env_or_default();
        let payment_hash_key = env::var("SW_PAYMENT_HASH_KEY").ok().unwrap_or_else(|| {
            warn!("🪛️ SW_PAYMENT_HASH_KEY is not set. Card hashes will be signed with an empty key.");
            String::default()
        });
        Self {
            host,
            port,
            database_url,
            max_connections,
            username_header,
            use_x_forwarded_for,
            use_forwarded,
            sweep_interval,
            hold_timeout,
            throttle_interval,
            spam_threshold,
            mail_interval,
            gateway,
            mail,
            payment_hash_key: Secret::new(payment_hash_key),
        }
    }
}

impl GatewayConfig {
    pub fn from_env_or_default() -> Self {
        let url = env::var("SW_GATEWAY_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ SW_GATEWAY_URL is not set. Using {DEFAULT_GATEWAY_URL}.");
            DEFAULT_GATEWAY_URL.to_string()
        });
        let api_key = env::var("SW_GATEWAY_API_KEY").ok().unwrap_or_else(|| {
            error!("🪛️ SW_GATEWAY_API_KEY is not set. Please set it to the API key for the payment gateway.");
            String::default()
        });
        let timeout = http_timeout("SW_GATEWAY_TIMEOUT");
        Self { url, api_key: Secret::new(api_key), timeout }
    }
}

impl MailConfig {
    pub fn from_env_or_default() -> Self {
        let api_url = env::var("SW_MAIL_API_URL").ok().filter(|s| !s.trim().is_empty());
        if api_url.is_none() {
            info!("🪛️ SW_MAIL_API_URL is not set. Outgoing mail will be written to the log.");
        }
        let api_key = env::var("SW_MAIL_API_KEY").map(Secret::new).unwrap_or_default();
        let default_sender = env::var("SW_MAIL_DEFAULT_SENDER").ok().unwrap_or_else(|| {
            info!("🪛️ SW_MAIL_DEFAULT_SENDER is not set. Using {DEFAULT_MAIL_SENDER}.");
            DEFAULT_MAIL_SENDER.to_string()
        });
        let timeout = http_timeout("SW_MAIL_TIMEOUT");
        Self { api_url, api_key, default_sender, timeout }
    }
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => {
            debug!("🪛️ {name} is not set. Using the default, {default}.");
            default
        },
    }
}

/// A request timeout in seconds. Zero would fail every request, so it is clamped to one second.
fn http_timeout(name: &str) -> Duration {
    Duration::from_secs(parse_env(name, DEFAULT_HTTP_TIMEOUT.as_secs()).max(1))
}

/// Reads an on/off environment flag. Unset or unrecognised values give `default`.
fn parse_flag(name: &str, default: bool) -> bool {
    let Ok(value) = env::var(name) else {
        return default;
    };
    flag_value(&value).unwrap_or_else(|| {
        warn!("🪛️ {value} is not a valid value for {name}. Expected true or false. Using {default}.");
        default
    })
}

fn flag_value(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that is used to configure the server's behaviour. Generally we try to keep this
/// as small as possible, and exclude secrets to avoid passing sensitive information around the system.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub username_header: String,
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self { username_header: DEFAULT_USERNAME_HEADER.to_string(), use_x_forwarded_for: false, use_forwarded: false }
    }
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            username_header: config.username_header.clone(),
            use_x_forwarded_for: config.use_x_forwarded_for,
            use_forwarded: config.use_forwarded,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flag_values() {
        assert_eq!(flag_value("1"), Some(true));
        assert_eq!(flag_value(" Yes "), Some(true));
        assert_eq!(flag_value("off"), Some(false));
        assert_eq!(flag_value("maybe"), None);
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::new("0.0.0.0", 9000);
        assert_eq!(config.port, 9000);
        assert_eq!(config.username_header, "sw_username");
        assert_eq!(config.hold_timeout, Duration::ZERO);
        assert_eq!(config.spam_threshold, 3);
        assert!(config.mail.api_url.is_none());
        assert!(config.payment_hash_key.is_empty());
        assert_eq!(config.gateway.timeout, Duration::from_secs(30));
        assert_eq!(config.mail.timeout, Duration::from_secs(30));
    }

    #[test]
    fn http_timeouts_from_env() {
        env::set_var("SW_TEST_TIMEOUT_SET", "5");
        assert_eq!(http_timeout("SW_TEST_TIMEOUT_SET"), Duration::from_secs(5));
        env::set_var("SW_TEST_TIMEOUT_ZERO", "0");
        assert_eq!(http_timeout("SW_TEST_TIMEOUT_ZERO"), Duration::from_secs(1));
        env::set_var("SW_TEST_TIMEOUT_BAD", "soon");
        assert_eq!(http_timeout("SW_TEST_TIMEOUT_BAD"), DEFAULT_HTTP_TIMEOUT);
        assert_eq!(http_timeout("SW_TEST_TIMEOUT_UNSET"), DEFAULT_HTTP_TIMEOUT);
    }
}
