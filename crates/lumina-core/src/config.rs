use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};
use crate::error::{LuminaError, Result};
use crate::gemini::{DEFAULT_API_BASE, DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_REQUEST_TIMEOUT};
use crate::poller::PollPolicy;
use crate::request::{ApiKey, DEFAULT_MODEL};

#[derive(Debug, Clone)]
pub struct StudioConfig {
    pub api_key: Option<ApiKey>,
    pub api_base: String,
    pub model: String,
    pub policy: PollPolicy,
    pub request_timeout: Duration,
    pub download_timeout: Duration,
    pub output_dir: PathBuf,
}

impl StudioConfig {
    /// Read `.env` (if present) and then the process environment.
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Ignoring unreadable .env: {}", e),
        }

        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var("GEMINI_API_KEY")
            .or_else(|| var("API_KEY"))
            .map(ApiKey::new)
            .transpose()?;

        let mut policy = PollPolicy::default();
        if let Some(secs) = parse::<u64>(&var, "LUMINA_POLL_INTERVAL_SECS")? {
            if secs == 0 {
                return Err(LuminaError::Config("LUMINA_POLL_INTERVAL_SECS must be positive".into()));
            }
            policy.interval = Duration::from_secs(secs);
        }
        if let Some(max) = parse::<u32>(&var, "LUMINA_MAX_POLL_ATTEMPTS")? {
            // 0 means unbounded
            policy.max_attempts = (max > 0).then_some(max);
        }
        if let Some(secs) = parse::<u64>(&var, "LUMINA_POLL_DEADLINE_SECS")? {
            policy.deadline = Some(Duration::from_secs(secs));
        }
        if let Some(retries) = parse::<u32>(&var, "LUMINA_TRANSPORT_RETRIES")? {
            policy.transport_retries = retries;
        }

        let request_timeout = parse::<u64>(&var, "LUMINA_REQUEST_TIMEOUT_SECS")?
            .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs);
        let download_timeout = parse::<u64>(&var, "LUMINA_DOWNLOAD_TIMEOUT_SECS")?
            .map_or(DEFAULT_DOWNLOAD_TIMEOUT, Duration::from_secs);

        let output_dir = var("LUMINA_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("lumina-studio"));

        Ok(Self {
            api_key,
            api_base: var("LUMINA_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            model: var("LUMINA_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            policy,
            request_timeout,
            download_timeout,
            output_dir,
        })
    }
}

fn parse<T: FromStr>(var: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    var(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| LuminaError::Config(format!("{} must be a number: {}", name, e)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<StudioConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StudioConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let conf = config(&[]).unwrap();
        assert!(conf.api_key.is_none());
        assert_eq!(conf.model, DEFAULT_MODEL);
        assert_eq!(conf.api_base, DEFAULT_API_BASE);
        assert_eq!(conf.policy, PollPolicy::default());
        assert_eq!(conf.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(conf.download_timeout, DEFAULT_DOWNLOAD_TIMEOUT);
    }

    #[test]
    fn test_timeout_overrides() {
        let conf = config(&[
            ("LUMINA_REQUEST_TIMEOUT_SECS", "15"),
            ("LUMINA_DOWNLOAD_TIMEOUT_SECS", "900"),
        ])
        .unwrap();

        assert_eq!(conf.request_timeout, Duration::from_secs(15));
        assert_eq!(conf.download_timeout, Duration::from_secs(900));
    }

    #[test]
    fn test_key_fallback() {
        let conf = config(&[("API_KEY", "fallback")]).unwrap();
        assert_eq!(conf.api_key.unwrap().expose(), "fallback");

        let conf = config(&[("API_KEY", "fallback"), ("GEMINI_API_KEY", "primary")]).unwrap();
        assert_eq!(conf.api_key.unwrap().expose(), "primary");
    }

    #[test]
    fn test_policy_overrides() {
        let conf = config(&[
            ("LUMINA_POLL_INTERVAL_SECS", "5"),
            ("LUMINA_MAX_POLL_ATTEMPTS", "0"),
            ("LUMINA_POLL_DEADLINE_SECS", "600"),
            ("LUMINA_TRANSPORT_RETRIES", "2"),
        ])
        .unwrap();

        assert_eq!(conf.policy.interval, Duration::from_secs(5));
        assert_eq!(conf.policy.max_attempts, None);
        assert_eq!(conf.policy.deadline, Some(Duration::from_secs(600)));
        assert_eq!(conf.policy.transport_retries, 2);
    }

    #[test]
    fn test_bad_numbers() {
        assert!(matches!(config(&[("LUMINA_POLL_INTERVAL_SECS", "ten")]), Err(LuminaError::Config(_))));
        assert!(matches!(config(&[("LUMINA_POLL_INTERVAL_SECS", "0")]), Err(LuminaError::Config(_))));
    }
}
