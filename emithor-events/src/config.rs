//! Registry configuration

use serde::{Deserialize, Serialize};

/// Registry configuration
///
/// Deserializable so it can sit inside a larger application config:
///
/// ```
/// use emithor_events::RegistryConfig;
///
/// let config: RegistryConfig = serde_json::from_str(r#"{ "enable_logging": false }"#).unwrap();
/// assert!(!config.enable_logging);
///
/// let config: RegistryConfig = serde_json::from_str("{}").unwrap();
/// assert!(config.enable_logging);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Emit `tracing` records for registrations, triggers and removals
    pub enable_logging: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            enable_logging: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert!(RegistryConfig::default().enable_logging);
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let config = RegistryConfig {
            enable_logging: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"enable_logging":false}"#);
        assert_eq!(serde_json::from_str::<RegistryConfig>(&json).unwrap(), config);
    }
}
