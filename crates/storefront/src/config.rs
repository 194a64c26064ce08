//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SUPABASE_URL` - Base URL of the hosted data store (REST API lives under `/rest/v1`)
//! - `SUPABASE_ANON_KEY` - Public API key of the data store
//! - `CLOUDINARY_CLOUD_NAME` - Image CDN cloud name
//! - `CLOUDINARY_UPLOAD_PRESET` - Unsigned upload preset
//!
//! ## Optional
//! - `ESTHER_HOST` - Bind address (default: 127.0.0.1)
//! - `ESTHER_PORT` - Listen port (default: 3000)
//! - `ESTHER_DATA_DIR` - Directory of the local key/value file (default: .esther)
//! - `ESTHER_ORDER_PHONE` - Chat number that receives orders (default: 74534873)
//! - `CLOUDINARY_API_KEY` - API key, needed to delete images
//! - `CLOUDINARY_API_SECRET` - API secret, needed to delete images
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the local key/value file
    pub data_dir: PathBuf,
    /// Chat number orders are sent to
    pub order_phone: String,
    pub supabase: SupabaseConfig,
    pub cloudinary: CloudinaryConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

/// Hosted data store configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: Url,
    pub anon_key: SecretString,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

/// Image CDN configuration.
///
/// Implements `Debug` manually to redact the API secret.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    pub api_key: Option<String>,
    pub api_secret: Option<SecretString>,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("upload_preset", &self.upload_preset)
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the CDN secret looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("ESTHER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ESTHER_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ESTHER_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ESTHER_PORT".to_string(), e.to_string()))?;
        let data_dir = PathBuf::from(get_env_or_default("ESTHER_DATA_DIR", ".esther"));
        let order_phone = get_env_or_default("ESTHER_ORDER_PHONE", "74534873");
        if order_phone.is_empty() || !order_phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidEnvVar(
                "ESTHER_ORDER_PHONE".to_string(),
                "must contain digits only".to_string(),
            ));
        }

        Ok(Self {
            host,
            port,
            data_dir,
            order_phone,
            supabase: SupabaseConfig::from_env()?,
            cloudinary: CloudinaryConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Path of the local key/value file.
    #[must_use]
    pub fn local_store_path(&self) -> PathBuf {
        self.data_dir.join("local-storage.json")
    }
}

impl SupabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("SUPABASE_URL")?;
        let url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string()))?;
        Ok(Self {
            url,
            anon_key: get_required_secret("SUPABASE_ANON_KEY")?,
        })
    }
}

impl CloudinaryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_secret = match get_optional_env("CLOUDINARY_API_SECRET") {
            Some(value) => {
                validate_secret_strength(&value, "CLOUDINARY_API_SECRET")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        Ok(Self {
            cloud_name: get_required_env("CLOUDINARY_CLOUD_NAME")?,
            upload_preset: get_required_env("CLOUDINARY_UPLOAD_PRESET")?,
            api_key: get_optional_env("CLOUDINARY_API_KEY"),
            api_secret,
        })
    }

    /// Whether signed calls (deletion) can be made.
    #[must_use]
    pub const fn can_sign(&self) -> bool {
        self.api_key.is_some() && self.api_secret.is_some()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable; empty counts as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Reject placeholder values and low-entropy strings.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cloudinary(secret: Option<&str>) -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: "dd8hdmg6r".to_string(),
            upload_preset: "esther_unsigned".to_string(),
            api_key: Some("123456789012345".to_string()),
            api_secret: secret.map(SecretString::from),
        }
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_placeholder_secret_is_rejected() {
        let err = validate_secret_strength("your-api-secret-here", "CLOUDINARY_API_SECRET")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
        assert!(validate_secret_strength("changeme", "X").is_err());
    }

    #[test]
    fn test_low_entropy_secret_is_rejected() {
        assert!(validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaa", "X").is_err());
    }

    #[test]
    fn test_random_secret_is_accepted() {
        assert!(validate_secret_strength("Qm7dK2vX9pL4sT8wR1nB6yH3jF0c", "X").is_ok());
    }

    #[test]
    fn test_can_sign_needs_key_and_secret() {
        assert!(cloudinary(Some("Qm7dK2vX9pL4sT8wR1nB6yH3jF0c")).can_sign());
        assert!(!cloudinary(None).can_sign());
    }

    #[test]
    fn test_socket_addr_and_store_path() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            data_dir: PathBuf::from("/tmp/esther"),
            order_phone: "74534873".to_string(),
            supabase: SupabaseConfig {
                url: Url::parse("https://abc.supabase.co").unwrap(),
                anon_key: SecretString::from("anon"),
            },
            cloudinary: cloudinary(None),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.port(), 3000);
        assert_eq!(
            config.local_store_path(),
            PathBuf::from("/tmp/esther/local-storage.json")
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let supabase = SupabaseConfig {
            url: Url::parse("https://abc.supabase.co").unwrap(),
            anon_key: SecretString::from("super_secret_anon_key"),
        };
        let debug_output = format!("{supabase:?} {:?}", cloudinary(Some("super_secret_api")));

        assert!(debug_output.contains("abc.supabase.co"));
        assert!(debug_output.contains("dd8hdmg6r"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_anon_key"));
        assert!(!debug_output.contains("super_secret_api"));
    }
}
