use std::env;
use std::time::Duration;

use crate::engine::motion::DEFAULT_JITTER_DEG;
use crate::error::AppError;
use crate::map::sim::SimulatedFix;
use crate::map::web::DEFAULT_TILE_URL_TEMPLATE;
use crate::map::MapBackendKind;
use crate::models::coordinate::Coordinate;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub tick_interval: Duration,
    pub command_queue_size: usize,
    pub event_buffer_size: usize,
    pub map_backend: MapBackendKind,
    pub tile_url_template: String,
    pub default_pickup: Coordinate,
    pub position_jitter_deg: f64,
    pub simulated_fix: SimulatedFix,
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let default_pickup = Coordinate {
            latitude: 37.7749,
            longitude: -122.4194,
        };

        Self {
            http_port: 3000,
            log_level: "info".to_string(),
            tick_interval: Duration::from_millis(3_000),
            command_queue_size: 32,
            event_buffer_size: 64,
            map_backend: MapBackendKind::Native,
            tile_url_template: DEFAULT_TILE_URL_TEMPLATE.to_string(),
            default_pickup,
            position_jitter_deg: DEFAULT_JITTER_DEG,
            simulated_fix: SimulatedFix::Granted(default_pickup),
            rng_seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        let default_pickup = Coordinate::new(
            parse_or_default("DEFAULT_LATITUDE", defaults.default_pickup.latitude)?,
            parse_or_default("DEFAULT_LONGITUDE", defaults.default_pickup.longitude)?,
        )
        .map_err(|err| AppError::Internal(format!("invalid default pickup: {err}")))?;

        let simulated_fix = match env::var("SIM_LOCATION") {
            Ok(raw) => parse_simulated_fix(&raw)?,
            Err(_) => SimulatedFix::Granted(default_pickup),
        };

        let map_backend = match env::var("MAP_BACKEND") {
            Ok(raw) => parse_backend(&raw)?,
            Err(_) => defaults.map_backend,
        };

        let rng_seed = match env::var("RNG_SEED") {
            Ok(raw) => Some(
                raw.parse::<u64>()
                    .map_err(|err| AppError::Internal(format!("invalid RNG_SEED: {err}")))?,
            ),
            Err(_) => None,
        };

        let config = Self {
            http_port: parse_or_default("HTTP_PORT", defaults.http_port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            tick_interval: Duration::from_millis(parse_or_default("TICK_INTERVAL_MS", 3_000u64)?),
            command_queue_size: parse_or_default("COMMAND_QUEUE_SIZE", defaults.command_queue_size)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", defaults.event_buffer_size)?,
            map_backend,
            tile_url_template: env::var("TILE_URL_TEMPLATE").unwrap_or(defaults.tile_url_template),
            default_pickup,
            position_jitter_deg: parse_or_default("POSITION_JITTER_DEG", defaults.position_jitter_deg)?,
            simulated_fix,
            rng_seed,
        };

        config.validate()?;
        Ok(config)
    }

    /// Rejects values that parse but cannot drive a trip.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.tick_interval.is_zero() {
            return Err(AppError::Internal(
                "invalid TICK_INTERVAL_MS: must be greater than 0".to_string(),
            ));
        }

        if !self.position_jitter_deg.is_finite() || self.position_jitter_deg < 0.0 {
            return Err(AppError::Internal(format!(
                "invalid POSITION_JITTER_DEG: {} is not a finite non-negative number",
                self.position_jitter_deg
            )));
        }

        Ok(())
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

fn parse_backend(raw: &str) -> Result<MapBackendKind, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "native" => Ok(MapBackendKind::Native),
        "web" => Ok(MapBackendKind::Web),
        other => Err(AppError::Internal(format!(
            "invalid MAP_BACKEND: {other}, expected native/web"
        ))),
    }
}

/// `lat,lng`, `denied` or `unavailable`.
fn parse_simulated_fix(raw: &str) -> Result<SimulatedFix, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "denied" => return Ok(SimulatedFix::Denied),
        "unavailable" => return Ok(SimulatedFix::Unavailable),
        _ => {}
    }

    let invalid = |reason: String| AppError::Internal(format!("invalid SIM_LOCATION: {reason}"));

    let (lat, lng) = raw
        .split_once(',')
        .ok_or_else(|| invalid(format!("expected lat,lng but got {raw}")))?;
    let lat = lat.trim().parse::<f64>().map_err(|err| invalid(err.to_string()))?;
    let lng = lng.trim().parse::<f64>().map_err(|err| invalid(err.to_string()))?;

    Coordinate::new(lat, lng)
        .map(SimulatedFix::Granted)
        .map_err(|err| invalid(err.to_string()))
}
