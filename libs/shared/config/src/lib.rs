use std::env;
use std::str::FromStr;

use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_port: u16,
    pub match_weight_load: f32,
    pub match_weight_rating: f32,
    pub match_weight_recency: f32,
    pub freshness_window_minutes: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_port: 3000,
            match_weight_load: 1.0 / 3.0,
            match_weight_rating: 1.0 / 3.0,
            match_weight_recency: 1.0 / 3.0,
            freshness_window_minutes: 15,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            listen_port: parse_env("DISPATCH_LISTEN_PORT", defaults.listen_port),
            match_weight_load: parse_env("DISPATCH_WEIGHT_LOAD", defaults.match_weight_load),
            match_weight_rating: parse_env("DISPATCH_WEIGHT_RATING", defaults.match_weight_rating),
            match_weight_recency: parse_env("DISPATCH_WEIGHT_RECENCY", defaults.match_weight_recency),
            freshness_window_minutes: parse_env(
                "DISPATCH_FRESHNESS_WINDOW_MINUTES",
                defaults.freshness_window_minutes,
            ),
        };

        if !config.is_valid() {
            warn!("Dispatch configuration out of range, falling back to defaults");
            return defaults;
        }

        config
    }

    pub fn is_valid(&self) -> bool {
        self.match_weight_load >= 0.0
            && self.match_weight_rating >= 0.0
            && self.match_weight_recency >= 0.0
            && self.freshness_window_minutes > 0
    }
}

fn parse_env<T: FromStr + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid value, using default", key);
            default
        }),
        Err(_) => default,
    }
}
