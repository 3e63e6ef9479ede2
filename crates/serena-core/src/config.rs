//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.
//!
//! Booking policy values (business hours, slot granularity, minimum gap) are
//! configuration, not recompiled literals, so they are tunable and testable
//! independently of the scheduling algorithms.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub booking: BookingConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u64 {
    30
}

/// Authentication configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,

    /// JWT token expiration in seconds
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_secs: i64,
}

fn default_jwt_expiration() -> i64 {
    86400 // 24 hours
}

/// Booking policy configuration
///
/// Injected into the availability rule set and conflict detector; the
/// scheduling algorithms never hardcode these values.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct BookingConfig {
    /// First hour of the day a reservation may start (inclusive)
    #[serde(default = "default_open_hour")]
    pub open_hour: u32,

    /// Hour of the day by which a reservation must end (sharp)
    #[serde(default = "default_close_hour")]
    pub close_hour: u32,

    /// Slot granularity: reservation starts must fall on this minute grid
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,

    /// Minimum buffer between two bookings of the same provider, in minutes
    #[serde(default = "default_min_gap_minutes")]
    pub min_gap_minutes: i64,
}

fn default_open_hour() -> u32 {
    9
}

fn default_close_hour() -> u32 {
    21
}

fn default_slot_minutes() -> u32 {
    30
}

fn default_min_gap_minutes() -> i64 {
    60
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            open_hour: default_open_hour(),
            close_hour: default_close_hour(),
            slot_minutes: default_slot_minutes(),
            min_gap_minutes: default_min_gap_minutes(),
        }
    }
}

impl BookingConfig {
    /// Check the policy values for internal consistency
    ///
    /// Runs at configuration load; the slot grid check divides by
    /// `slot_minutes`, so a zero here must never reach the scheduler.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_minutes < 1 || self.slot_minutes > 60 {
            return Err(ConfigError::Message(format!(
                "booking.slot_minutes must be between 1 and 60, got {}",
                self.slot_minutes
            )));
        }
        if self.open_hour > 23 {
            return Err(ConfigError::Message(format!(
                "booking.open_hour must be between 0 and 23, got {}",
                self.open_hour
            )));
        }
        if self.close_hour > 24 {
            return Err(ConfigError::Message(format!(
                "booking.close_hour must be between 1 and 24, got {}",
                self.close_hour
            )));
        }
        if self.open_hour >= self.close_hour {
            return Err(ConfigError::Message(format!(
                "booking.open_hour ({}) must be before booking.close_hour ({})",
                self.open_hour, self.close_hour
            )));
        }
        if self.min_gap_minutes < 0 {
            return Err(ConfigError::Message(format!(
                "booking.min_gap_minutes must not be negative, got {}",
                self.min_gap_minutes
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.max_connections", 10)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("auth.jwt_expiration_secs", 86400)?
            .set_default("booking.open_hour", 9)?
            .set_default("booking.close_hour", 21)?
            .set_default("booking.slot_minutes", 30)?
            .set_default("booking.min_gap_minutes", 60)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with SERENA_ prefix
            .add_source(
                Environment::with_prefix("SERENA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.booking.validate()?;
        Ok(app_config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("SERENA").separator("__"))
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.booking.validate()?;
        Ok(app_config)
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_booking_config() {
        let config = BookingConfig::default();
        assert_eq!(config.open_hour, 9);
        assert_eq!(config.close_hour, 21);
        assert_eq!(config.slot_minutes, 30);
        assert_eq!(config.min_gap_minutes, 60);
    }

    #[test]
    fn test_default_booking_config_validates() {
        assert!(BookingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_slot_minutes_rejected() {
        let config = BookingConfig {
            slot_minutes: 0,
            ..BookingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_hours_rejected() {
        let config = BookingConfig {
            open_hour: 21,
            close_hour: 9,
            ..BookingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_hours_rejected() {
        let late_open = BookingConfig {
            open_hour: 24,
            ..BookingConfig::default()
        };
        assert!(late_open.validate().is_err());

        let late_close = BookingConfig {
            close_hour: 25,
            ..BookingConfig::default()
        };
        assert!(late_close.validate().is_err());
    }

    #[test]
    fn test_negative_gap_rejected() {
        let config = BookingConfig {
            min_gap_minutes: -30,
            ..BookingConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_midnight_close_accepted() {
        let config = BookingConfig {
            close_hour: 24,
            ..BookingConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
