use crate::ranker::RequestMode;
use crate::validation::{FormPolicy, MetadataDefaults};
use chrono::NaiveDate;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base address of the Prediction and Notes services, without trailing slash.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Labels a score is mapped onto. May be empty; mapping then fails.
    pub labels: Vec<String>,
    pub form_policy: FormPolicy,
    pub metadata_defaults: MetadataDefaults,
    pub request_mode: RequestMode,
}

impl Config {
    /// Configuration pointing at `api_base_url` with every other value defaulted.
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            labels: Vec::new(),
            form_policy: FormPolicy::default(),
            metadata_defaults: MetadataDefaults::default(),
            request_mode: RequestMode::default(),
        }
    }

    /// Resolves the configuration once from the environment (and `.env`).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let fallback = MetadataDefaults::default();

        let config = Self {
            api_base_url: std::env::var("MATCH_API_URL")
                .or_else(|_| std::env::var("API_BASE_URL"))
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|url| validate_base_url(&url))
                .transpose()?
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            request_timeout_secs: std::env::var("MATCH_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|_| {
                    anyhow::anyhow!("MATCH_REQUEST_TIMEOUT_SECS must be a whole number of seconds")
                })
                .and_then(|secs: u64| {
                    if secs == 0 {
                        anyhow::bail!("MATCH_REQUEST_TIMEOUT_SECS must be greater than zero");
                    }
                    Ok(secs)
                })?,
            labels: std::env::var("MATCH_LABELS")
                .map(|raw| parse_labels(&raw))
                .unwrap_or_default(),
            form_policy: std::env::var("MATCH_FORM_POLICY")
                .ok()
                .map(|raw| raw.parse::<FormPolicy>())
                .transpose()?
                .unwrap_or_default(),
            metadata_defaults: MetadataDefaults {
                primary_age: env_or("MATCH_DEFAULT_AGE", fallback.primary_age)?,
                primary_dob: env_date_or("MATCH_DEFAULT_DOB", fallback.primary_dob)?,
                secondary_age: env_or("MATCH_DEFAULT_SECONDARY_AGE", fallback.secondary_age)?,
                secondary_dob: env_date_or("MATCH_DEFAULT_SECONDARY_DOB", fallback.secondary_dob)?,
            },
            request_mode: std::env::var("MATCH_REQUEST_MODE")
                .ok()
                .map(|raw| raw.parse::<RequestMode>())
                .transpose()?
                .unwrap_or_default(),
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("API base URL: {}", config.api_base_url);
        tracing::debug!("Request timeout: {}s", config.request_timeout_secs);
        tracing::debug!("Labels configured: {}", config.labels.len());
        tracing::debug!("Form policy: {:?}", config.form_policy);
        tracing::debug!("Request mode: {:?}", config.request_mode);

        Ok(config)
    }
}

/// Checks the scheme and strips trailing slashes so paths can be appended.
pub fn validate_base_url(url: &str) -> anyhow::Result<String> {
    let url = url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("MATCH_API_URL must start with http:// or https://");
    }
    url::Url::parse(url).map_err(|e| anyhow::anyhow!("MATCH_API_URL is not a valid URL: {}", e))?;
    Ok(url.trim_end_matches('/').to_string())
}

/// Splits a comma-separated label list, dropping blank entries.
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

fn env_date_or(key: &str, default: NaiveDate) -> anyhow::Result<NaiveDate> {
    match std::env::var(key) {
        Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| anyhow::anyhow!("{} must be a YYYY-MM-DD date, got {}", key, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_url() {
        assert_eq!(
            validate_base_url("https://api.example.com/").unwrap(),
            "https://api.example.com"
        );
        assert!(validate_base_url("ftp://api.example.com").is_err());
        assert!(validate_base_url("api.example.com").is_err());
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(parse_labels("Gold, Silver,,Bronze "), vec!["Gold", "Silver", "Bronze"]);
        assert!(parse_labels(" , ").is_empty());
    }

    #[test]
    fn test_with_base_url_defaults() {
        let config = Config::with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.labels.is_empty());
        assert_eq!(config.form_policy, FormPolicy::NamesOnly);
        assert_eq!(config.request_mode, RequestMode::Sequential);
    }
}
