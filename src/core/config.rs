use crate::core::kernel::signer::KeyType;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;

pub const MAINNET_BASE_URL: &str = "https://api.binance.com";
pub const TESTNET_BASE_URL: &str = "https://testnet.binance.vision";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: Secret<String>,
    pub secret_key: Secret<String>,
    pub key_type: KeyType,
    pub testnet: bool,
    pub base_url: Option<String>,
    pub user_agent: String,
    pub debug: bool,
    pub timeout_secs: u64,
    pub proxy: Option<String>,
}

// Never expose secrets in serialization
impl Serialize for ClientConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ClientConfig", 9)?;
        state.serialize_field("api_key", "[REDACTED]")?;
        state.serialize_field("secret_key", "[REDACTED]")?;
        state.serialize_field("key_type", self.key_type.as_str())?;
        state.serialize_field("testnet", &self.testnet)?;
        state.serialize_field("base_url", &self.base_url)?;
        state.serialize_field("user_agent", &self.user_agent)?;
        state.serialize_field("debug", &self.debug)?;
        state.serialize_field("timeout_secs", &self.timeout_secs)?;
        state.serialize_field("proxy", &self.proxy)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ClientConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ClientConfigHelper {
            api_key: String,
            secret_key: String,
            #[serde(default)]
            key_type: Option<String>,
            #[serde(default)]
            testnet: bool,
            #[serde(default)]
            base_url: Option<String>,
            #[serde(default)]
            user_agent: Option<String>,
            #[serde(default)]
            debug: bool,
            #[serde(default)]
            timeout_secs: Option<u64>,
            #[serde(default)]
            proxy: Option<String>,
        }

        let helper = ClientConfigHelper::deserialize(deserializer)?;
        let key_type = match helper.key_type {
            Some(raw) => raw.parse().map_err(serde::de::Error::custom)?,
            None => KeyType::default(),
        };

        Ok(Self {
            api_key: Secret::new(helper.api_key),
            secret_key: Secret::new(helper.secret_key),
            key_type,
            testnet: helper.testnet,
            base_url: helper.base_url,
            user_agent: helper.user_agent.unwrap_or_else(default_user_agent),
            debug: helper.debug,
            timeout_secs: helper.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            proxy: helper.proxy,
        })
    }
}

fn default_user_agent() -> String {
    format!("binance-rest/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    /// Create a new configuration with API credentials
    #[must_use]
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            key_type: KeyType::Hmac,
            testnet: false,
            base_url: None,
            user_agent: default_user_agent(),
            debug: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            proxy: None,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `{PREFIX}_API_KEY` (e.g., `BINANCE_API_KEY`)
    /// - `{PREFIX}_SECRET_KEY` (HMAC secret or PEM private key)
    /// - `{PREFIX}_KEY_TYPE` (optional, `HMAC`, `RSA` or `ED25519`)
    /// - `{PREFIX}_TESTNET` (optional, defaults to false)
    /// - `{PREFIX}_BASE_URL` (optional)
    /// - `{PREFIX}_PROXY` (optional)
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.to_uppercase();
        let api_key_var = format!("{}_API_KEY", prefix);
        let secret_key_var = format!("{}_SECRET_KEY", prefix);

        let api_key = env::var(&api_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(api_key_var))?;

        let secret_key = env::var(&secret_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(secret_key_var))?;

        let key_type = match env::var(format!("{}_KEY_TYPE", prefix)) {
            Ok(raw) => raw
                .parse()
                .map_err(|e| ConfigError::InvalidConfiguration(format!("{}", e)))?,
            Err(_) => KeyType::default(),
        };

        let testnet = env::var(format!("{}_TESTNET", prefix))
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let mut config = Self::new(api_key, secret_key)
            .key_type(key_type)
            .testnet(testnet);
        config.base_url = env::var(format!("{}_BASE_URL", prefix)).ok();
        config.proxy = env::var(format!("{}_PROXY", prefix)).ok();

        Ok(config)
    }

    /// Load a `.env` file (if present) and then read the environment.
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(prefix, ".env")
    }

    /// Same as [`Self::from_env_file`] with an explicit path
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(prefix: &str, env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // fall back to the process environment
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env(prefix)
    }

    /// Configuration for public endpoints only
    #[must_use]
    pub fn read_only() -> Self {
        Self::new(String::new(), String::new())
    }

    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.secret_key.expose_secret().is_empty()
    }

    #[must_use]
    pub const fn testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub const fn key_type(mut self, key_type: KeyType) -> Self {
        self.key_type = key_type;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub const fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Route every request through an `http://` or `https://` proxy
    #[must_use]
    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.proxy = Some(proxy_url.into());
        self
    }

    /// Base URL after applying the testnet switch and any explicit override
    pub fn resolved_base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.trim_end_matches('/').to_string();
        }
        if self.testnet {
            TESTNET_BASE_URL.to_string()
        } else {
            MAINNET_BASE_URL.to_string()
        }
    }

    /// Get API key (use carefully - exposes secret)
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Get secret key (use carefully - exposes secret)
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_resolution() {
        let config = ClientConfig::new("k".into(), "s".into());
        assert_eq!(config.resolved_base_url(), MAINNET_BASE_URL);

        let config = config.testnet(true);
        assert_eq!(config.resolved_base_url(), TESTNET_BASE_URL);

        let config = config.base_url("http://localhost:8080/");
        assert_eq!(config.resolved_base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_serialization_redacts_secrets() {
        let config = ClientConfig::new("my-key".into(), "my-secret".into());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("my-key"));
        assert!(!json.contains("my-secret"));
        assert!(json.contains("[REDACTED]"));
    }

    #[test]
    fn test_deserialize_with_key_type() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"api_key":"k","secret_key":"s","key_type":"ed25519","testnet":true}"#,
        )
        .unwrap();
        assert_eq!(config.key_type, KeyType::Ed25519);
        assert!(config.testnet);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);

        let err = serde_json::from_str::<ClientConfig>(
            r#"{"api_key":"k","secret_key":"s","key_type":"DSA"}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_read_only_has_no_credentials() {
        assert!(!ClientConfig::read_only().has_credentials());
        assert!(ClientConfig::new("k".into(), "s".into()).has_credentials());
    }

    #[test]
    fn test_debug_output_hides_secret() {
        let config = ClientConfig::new("k".into(), "super-secret".into());
        assert!(!format!("{:?}", config).contains("super-secret"));
    }
}
