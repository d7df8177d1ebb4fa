use std::env;
use std::time::Duration;

use crate::engine::policy::{
    ProximityPolicy, DEFAULT_ACCURACY_CAP_MULTIPLIER, DEFAULT_NOMINAL_RADIUS_METERS,
};
use crate::error::AppError;
use crate::observability::logging::LogFormat;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub nominal_radius_meters: f64,
    pub accuracy_cap_multiplier: f64,
    pub store_timeout: Duration,
    pub event_buffer_size: usize,
    pub audit_rejections: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: parse_or_default("LOG_FORMAT", LogFormat::Human)?,
            nominal_radius_meters: parse_or_default(
                "NOMINAL_RADIUS_METERS",
                DEFAULT_NOMINAL_RADIUS_METERS,
            )?,
            accuracy_cap_multiplier: parse_or_default(
                "ACCURACY_CAP_MULTIPLIER",
                DEFAULT_ACCURACY_CAP_MULTIPLIER,
            )?,
            store_timeout: Duration::from_millis(parse_or_default("STORE_TIMEOUT_MS", 2_000u64)?),
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 1024)?,
            audit_rejections: parse_or_default("AUDIT_REJECTIONS", false)?,
        })
    }

    pub fn proximity_policy(&self) -> Result<ProximityPolicy, AppError> {
        ProximityPolicy::new(self.nominal_radius_meters, self.accuracy_cap_multiplier)
            .map_err(|err| AppError::Internal(format!("invalid proximity settings: {err}")))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            log_format: LogFormat::Human,
            nominal_radius_meters: DEFAULT_NOMINAL_RADIUS_METERS,
            accuracy_cap_multiplier: DEFAULT_ACCURACY_CAP_MULTIPLIER,
            store_timeout: Duration::from_secs(2),
            event_buffer_size: 1024,
            audit_rejections: false,
        }
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn default_config_yields_reference_policy() {
        let policy = Config::default().proximity_policy().unwrap();
        assert_eq!(policy.nominal_radius_meters(), 50.0);
        assert_eq!(policy.max_radius_meters(), 150.0);
    }

    #[test]
    fn invalid_radius_is_rejected() {
        let config = Config {
            nominal_radius_meters: -1.0,
            ..Config::default()
        };
        assert!(config.proximity_policy().is_err());
    }
}
