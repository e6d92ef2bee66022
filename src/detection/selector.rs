use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::Color;
use crate::error::ConfigError;

/// A named target color with its matching tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    pub id: i64,
    pub name: String,
    pub color: Color,
    pub margin: f64,
    /// Servo angle kept for the actuator's own configuration; unused here.
    #[serde(default)]
    pub angle: i64,
}

impl Selector {
    pub fn new(id: i64, name: impl Into<String>, color: Color, margin: f64, angle: i64) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            margin,
            angle,
        }
    }

    pub fn matches(&self, color: &Color) -> bool {
        self.color.distance(color) <= self.margin
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(ConfigError::InvalidMargin {
                id: self.id,
                margin: self.margin,
            });
        }
        Ok(())
    }
}

/// Ordered selectors and the actuator address. An empty address disables
/// notifications without disabling detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DetectorConfig {
    pub selectors: Vec<Selector>,
    pub notify_address: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            selectors: vec![
                Selector::new(1, "red", Color::new(255, 0, 0), 60.0, 0),
                Selector::new(2, "green", Color::new(0, 255, 0), 60.0, 90),
                Selector::new(3, "blue", Color::new(0, 0, 255), 60.0, 180),
            ],
            notify_address: String::new(),
        }
    }
}

impl DetectorConfig {
    pub fn notifications_enabled(&self) -> bool {
        !self.notify_address.trim().is_empty()
    }

    pub fn notify_address(&self) -> Option<&str> {
        let address = self.notify_address.trim();
        (!address.is_empty()).then_some(address)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.selectors.iter().try_for_each(Selector::validate)
    }

    /// Parses a stored document, with missing keys keeping their defaults.
    pub fn from_document(document: &[u8]) -> Result<Self, ConfigError> {
        let config: DetectorConfig = serde_json::from_slice(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies a partial update document. `selectors` is required and
    /// replaces the list; `notifyAddress` is optional.
    pub fn apply_update(&self, update: &Value) -> Result<Self, ConfigError> {
        let fields = update.as_object().ok_or(ConfigError::NotAnObject)?;
        let selectors = fields
            .get("selectors")
            .ok_or(ConfigError::MissingSelectors)?;
        let selectors: Vec<Selector> =
            serde_json::from_value(selectors.clone()).map_err(|e| ConfigError::InvalidField {
                field: "selectors",
                reason: e.to_string(),
            })?;

        let notify_address = match fields.get("notifyAddress") {
            None => self.notify_address.clone(),
            Some(Value::String(address)) => address.trim().to_string(),
            Some(other) => {
                return Err(ConfigError::InvalidField {
                    field: "notifyAddress",
                    reason: format!("expected a string, got {other}"),
                });
            }
        };

        let updated = DetectorConfig {
            selectors,
            notify_address,
        };
        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_keys_keep_defaults() {
        let config = DetectorConfig::from_document(br#"{"notifyAddress": "10.0.0.7"}"#).unwrap();
        assert_eq!(config.selectors, DetectorConfig::default().selectors);
        assert_eq!(config.notify_address, "10.0.0.7");
    }

    #[test]
    fn selectors_round_trip_with_hex_colors() {
        let doc = br##"{"selectors":[{"id":7,"name":"paper","color":"#F0F0E0","margin":12.5,"angle":45}],"notifyAddress":""}"##;
        let config = DetectorConfig::from_document(doc).unwrap();
        assert_eq!(config.selectors[0].color, Color::new(0xf0, 0xf0, 0xe0));
        let rendered = serde_json::to_value(&config).unwrap();
        assert_eq!(rendered["selectors"][0]["color"], "#f0f0e0");
        assert_eq!(rendered["selectors"][0]["angle"], 45);
    }

    #[test]
    fn negative_margin_is_rejected() {
        let doc = br##"{"selectors":[{"id":1,"name":"x","color":"#000000","margin":-1}]}"##;
        assert!(matches!(
            DetectorConfig::from_document(doc),
            Err(ConfigError::InvalidMargin { id: 1, .. })
        ));
    }

    #[test]
    fn empty_address_disables_notifications() {
        let mut config = DetectorConfig::default();
        assert!(!config.notifications_enabled());
        config.notify_address = "   ".to_string();
        assert_eq!(config.notify_address(), None);
        config.notify_address = "sorter.local".to_string();
        assert_eq!(config.notify_address(), Some("sorter.local"));
    }

    #[test]
    fn update_requires_selectors() {
        let config = DetectorConfig::default();
        assert!(matches!(
            config.apply_update(&json!({"notifyAddress": "1.2.3.4"})),
            Err(ConfigError::MissingSelectors)
        ));
        assert!(matches!(
            config.apply_update(&json!([1, 2])),
            Err(ConfigError::NotAnObject)
        ));
    }

    #[test]
    fn update_keeps_address_when_absent() {
        let mut config = DetectorConfig::default();
        config.notify_address = "192.168.1.40".to_string();
        let updated = config
            .apply_update(&json!({
                "selectors": [{"id": 4, "name": "can", "color": "#c0c0c0", "margin": 0}]
            }))
            .unwrap();
        assert_eq!(updated.notify_address, "192.168.1.40");
        assert_eq!(updated.selectors.len(), 1);
        assert_eq!(updated.selectors[0].angle, 0);
    }

    #[test]
    fn update_rejects_bad_colors() {
        let config = DetectorConfig::default();
        let result = config.apply_update(&json!({
            "selectors": [{"id": 1, "name": "x", "color": "nope", "margin": 3}]
        }));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidField { field: "selectors", .. })
        ));
    }
}
