use anyhow::Error;
use confique::Config;
use regex::Regex;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Config)]
pub struct SensgraphConfig {
    /// Downsampling trigger: a window retaining more points than this is
    /// reduced to the fixed bucket count.
    #[config(env = "SENSGRAPH_MAX_POINTS", default = 400)]
    pub max_points: usize,

    /// Default time window, in hours back from now.
    #[config(env = "SENSGRAPH_INTERVAL_HOURS", default = 24)]
    pub interval_hours: u32,

    /// Interfaces whose description matches any of these patterns are
    /// dropped before normalization: aggregate and virtual interfaces
    /// that would double-count traffic.
    #[config(default = [
        "^unrouted[ -]VLAN",
        "^Control.Plane.Interface",
        "^[ -]Link[ -]Aggregate[ -]",
        "^[ -]CPU[ -]Interface[ -]for[ -]Unit:[ -]",
        "^Backbone$",
    ])]
    pub excluded_interfaces: Vec<String>,
}

impl SensgraphConfig {
    pub fn load() -> Result<SensgraphConfig, Error> {
        let c = SensgraphConfig::builder()
            .env()
            .file("settings.toml")
            .load()?;

        Ok(c)
    }

    pub fn compile_excluded_interfaces(&self) -> Result<Vec<Regex>, Error> {
        self.excluded_interfaces
            .iter()
            .map(|pattern| Ok(Regex::new(pattern)?))
            .collect()
    }
}

static SENSGRAPH_CONFIG: OnceLock<Arc<SensgraphConfig>> = OnceLock::new();

pub fn get() -> Result<Arc<SensgraphConfig>, Error> {
    SENSGRAPH_CONFIG.get().cloned().ok_or_else(|| {
        Error::msg(
            "Configuration not loaded. Please call load_configuration() before using the configuration",
        )
    })
}

pub fn load_configuration() -> Result<(), Error> {
    // Check if the configuration has already been loaded
    if SENSGRAPH_CONFIG.get().is_some() {
        return Ok(());
    }

    let config = SensgraphConfig::load()?;
    SENSGRAPH_CONFIG.get_or_init(|| Arc::new(config));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config() {
        let config = SensgraphConfig::load().unwrap();

        assert_eq!(config.max_points, 400);
        assert_eq!(config.interval_hours, 24);
    }

    #[test]
    fn test_default_exclusions_compile_and_match() {
        let config = SensgraphConfig::load().unwrap();
        let patterns = config.compile_excluded_interfaces().unwrap();
        assert!(
            patterns
                .iter()
                .any(|p| p.is_match("unrouted VLAN 1002"))
        );
        assert!(patterns.iter().any(|p| p.is_match("Backbone")));
        assert!(!patterns.iter().any(|p| p.is_match("GigabitEthernet1/0/1")));
    }
}
