use crate::ir::SeatType;
use crate::layout::DEFAULT_RECLINEMENT_ANGLE;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    pub reclinement_angle: u32,
    pub seat_type: SeatType,
    pub window_amenity: String,
    pub first_seat_number: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            reclinement_angle: 15,
            seat_type: SeatType::Regular,
            window_amenity: "window".to_string(),
            first_seat_number: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationMode {
    /// Stop at the first violation.
    #[default]
    FailFast,
    /// Report every violation found.
    CollectAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfig {
    pub mode: ValidationMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileConfig {
    pub default_reclinement_angle: u32,
    pub default_seat_type: SeatType,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            default_reclinement_angle: DEFAULT_RECLINEMENT_ANGLE,
            default_seat_type: SeatType::Regular,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub generator: GeneratorConfig,
    pub validation: ValidationConfig,
    pub reconcile: ReconcileConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeneratorConfigFile {
    reclinement_angle: Option<u32>,
    seat_type: Option<SeatType>,
    window_amenity: Option<String>,
    first_seat_number: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ValidationConfigFile {
    mode: Option<ValidationMode>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ReconcileConfigFile {
    default_reclinement_angle: Option<u32>,
    default_seat_type: Option<SeatType>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    generator: Option<GeneratorConfigFile>,
    validation: Option<ValidationConfigFile>,
    reconcile: Option<ReconcileConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parsing config file {}", path.display()))
}

/// Parses a config document, accepting JSON5 when strict JSON fails.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents).map_err(|json5_err| {
            anyhow::anyhow!("invalid config: {json_err} (as JSON5: {json5_err})")
        })?,
    };
    Ok(merge_config(Config::default(), parsed))
}

fn merge_config(mut config: Config, file: ConfigFile) -> Config {
    if let Some(generator) = file.generator {
        if let Some(v) = generator.reclinement_angle {
            config.generator.reclinement_angle = v;
        }
        if let Some(v) = generator.seat_type {
            config.generator.seat_type = v;
        }
        if let Some(v) = generator.window_amenity {
            config.generator.window_amenity = v;
        }
        if let Some(v) = generator.first_seat_number {
            config.generator.first_seat_number = v;
        }
    }
    if let Some(validation) = file.validation {
        if let Some(v) = validation.mode {
            config.validation.mode = v;
        }
    }
    if let Some(reconcile) = file.reconcile {
        if let Some(v) = reconcile.default_reclinement_angle {
            config.reconcile.default_reclinement_angle = v;
        }
        if let Some(v) = reconcile.default_seat_type {
            config.reconcile.default_seat_type = v;
        }
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_generated_diagram_conventions() {
        let config = Config::default();
        assert_eq!(config.generator.reclinement_angle, 15);
        assert_eq!(config.generator.first_seat_number, 1);
        assert_eq!(config.reconcile.default_reclinement_angle, 120);
        assert_eq!(config.validation.mode, ValidationMode::FailFast);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let config = parse_config(
            r#"{"generator":{"reclinementAngle":30},"validation":{"mode":"collectAll"}}"#,
        )
        .unwrap();
        assert_eq!(config.generator.reclinement_angle, 30);
        assert_eq!(config.generator.window_amenity, "window");
        assert_eq!(config.validation.mode, ValidationMode::CollectAll);
        assert_eq!(config.reconcile, ReconcileConfig::default());
    }

    #[test]
    fn accepts_json5_comments() {
        let config = parse_config(
            "{\n  // premium coaches\n  reconcile: { defaultSeatType: 'premium' },\n}",
        )
        .unwrap();
        assert_eq!(config.reconcile.default_seat_type, SeatType::Premium);
    }

    #[test]
    fn serialized_config_reads_back_as_a_config_file() {
        let mut config = Config::default();
        config.generator.first_seat_number = 11;
        config.validation.mode = ValidationMode::CollectAll;
        config.reconcile.default_seat_type = SeatType::Sleeper;
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"firstSeatNumber\":11"), "{json}");
        assert!(json.contains("\"defaultSeatType\":\"sleeper\""), "{json}");
        assert_eq!(parse_config(&json).unwrap(), config);
        assert_eq!(serde_json::from_str::<Config>(&json).unwrap(), config);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_config("not a config").is_err());
    }

    #[test]
    fn missing_path_yields_defaults() {
        assert_eq!(load_config(None).unwrap(), Config::default());
    }
}
