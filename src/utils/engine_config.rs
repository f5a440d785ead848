// src/utils/engine_config.rs

use log::{debug, info};
use std::env;

use crate::models::UndeterminedCountryPolicy;
use crate::utils::constants::DEFAULT_FILTER_CACHE_SIZE;

/// Configuration for the facet engine and the `facets` binary
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Number of filter/count views kept in memory (oldest evicted first)
    pub filter_cache_size: usize,
    /// Whether undetermined-country properties appear when both countries are selected
    pub undetermined_country: UndeterminedCountryPolicy,
    /// Whether facet counts only include properties that can be placed on the map
    pub counts_require_coordinates: bool,
    /// Default endpoint for raw property records
    pub source_url: Option<String>,
    /// Whether to show a spinner while fetching
    pub progress_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            filter_cache_size: DEFAULT_FILTER_CACHE_SIZE,
            undetermined_country: UndeterminedCountryPolicy::IncludePlausible,
            counts_require_coordinates: true,
            source_url: None,
            progress_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Create engine configuration from environment variables
    pub fn from_env() -> Self {
        let filter_cache_size = env::var("FACET_FILTER_CACHE_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_FILTER_CACHE_SIZE);

        let undetermined_country = env::var("FACET_UNDETERMINED_COUNTRY")
            .ok()
            .and_then(|s| s.parse::<UndeterminedCountryPolicy>().ok())
            .unwrap_or_default();

        let counts_require_coordinates = env::var("FACET_COUNTS_REQUIRE_COORDINATES")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        let source_url = env::var("PROPERTY_SOURCE_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let progress_enabled = env::var("PROGRESS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        let config = Self {
            filter_cache_size,
            undetermined_country,
            counts_require_coordinates,
            source_url,
            progress_enabled,
        };
        debug!("Engine config from env: {:?}", config);
        config
    }

    /// Log the current configuration
    pub fn log_config(&self) {
        info!("🗺️ Facet engine configuration");
        info!("   Filter cache size: {}", self.filter_cache_size);
        match self.undetermined_country {
            UndeterminedCountryPolicy::IncludePlausible => {
                info!("   Undetermined countries: included when both countries are selected")
            }
            UndeterminedCountryPolicy::Exclude => {
                info!("   Undetermined countries: excluded")
            }
        }
        info!(
            "   Facet counts require coordinates: {}",
            self.counts_require_coordinates
        );
        match &self.source_url {
            Some(url) => info!("   Default record source: {}", url),
            None => info!("   No default record source configured"),
        }
    }
}
