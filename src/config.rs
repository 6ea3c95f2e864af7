// Booking page configuration
use crate::error::{BookingError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BookingConfig {
    // Currency code prefixed to every displayed price
    pub currency: String,
    // Latency of the simulated submission backend
    pub submission_delay_ms: u64,
    // How long the notification surface should keep a message visible
    pub notification_duration_ms: u64,
    // Shown for summary fields that have no value yet
    pub unset_placeholder: String,
    pub price_caption: String,
    pub availability_badge: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            currency: "GHS".to_string(),
            submission_delay_ms: 2000,
            notification_duration_ms: 3000,
            unset_placeholder: "-".to_string(),
            price_caption: "per academic year".to_string(),
            availability_badge: "Available".to_string(),
        }
    }
}

impl BookingConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: BookingConfig =
            serde_json::from_str(json).map_err(|e| BookingError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.currency.trim().is_empty() {
            return Err(BookingError::ConfigError(
                "currency must not be empty".to_string(),
            ));
        }
        if self.unset_placeholder.is_empty() {
            return Err(BookingError::ConfigError(
                "unset placeholder must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn submission_delay(&self) -> Duration {
        Duration::from_millis(self.submission_delay_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }
}
