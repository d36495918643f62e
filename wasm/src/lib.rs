use seatmap::config::{Config, ValidationMode, parse_config};
use seatmap::{LayoutSpec, Space, SpaceConfigInput, SpaceRecord, generate_layout, reconcile, validate};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EngineOptions {
    double_decker: Option<bool>,
    collect_all: Option<bool>,
    config: Option<serde_json::Value>,
}

fn parse_options(options_json: Option<String>) -> Result<EngineOptions, String> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(|error| error.to_string()),
        None => Ok(EngineOptions::default()),
    }
}

fn build_config(options: &EngineOptions) -> Result<Config, String> {
    match &options.config {
        Some(value) => parse_config(&value.to_string()).map_err(|error| format!("{error:#}")),
        None => Ok(Config::default()),
    }
}

fn generate(spec_json: &str, options: EngineOptions) -> Result<String, String> {
    let config = build_config(&options)?;
    let spec: LayoutSpec = serde_json::from_str(spec_json).map_err(|error| error.to_string())?;
    spec.verify().map_err(|error| error.to_string())?;
    let double_decker = options
        .double_decker
        .unwrap_or_else(|| spec.is_double_decker());
    let spaces =
        generate_layout(&spec, double_decker, &config.generator).map_err(|error| error.to_string())?;
    let records: Vec<SpaceRecord> = spaces.iter().map(SpaceRecord::from).collect();
    serde_json::to_string(&records).map_err(|error| error.to_string())
}

fn check(spaces_json: &str, spec_json: Option<&str>, options: EngineOptions) -> Result<String, String> {
    let config = build_config(&options)?;
    let inputs: Vec<SpaceConfigInput> =
        serde_json::from_str(spaces_json).map_err(|error| error.to_string())?;
    let spec: Option<LayoutSpec> = match spec_json {
        Some(raw) => Some(serde_json::from_str(raw).map_err(|error| error.to_string())?),
        None => None,
    };
    if let Some(spec) = &spec {
        spec.verify().map_err(|error| error.to_string())?;
    }
    let mode = if options.collect_all.unwrap_or(false) {
        ValidationMode::CollectAll
    } else {
        config.validation.mode
    };
    let violations = match validate(&inputs, spec.as_ref(), mode) {
        Ok(()) => Vec::new(),
        Err(error) => error.into_violations(),
    };
    serde_json::to_string(&violations).map_err(|error| error.to_string())
}

fn diff(
    incoming_json: &str,
    existing_json: &str,
    spec_json: &str,
    options: EngineOptions,
) -> Result<String, String> {
    let config = build_config(&options)?;
    let incoming: Vec<SpaceConfigInput> =
        serde_json::from_str(incoming_json).map_err(|error| error.to_string())?;
    let existing: Vec<Space> =
        serde_json::from_str(existing_json).map_err(|error| error.to_string())?;
    let spec: LayoutSpec = serde_json::from_str(spec_json).map_err(|error| error.to_string())?;
    spec.verify().map_err(|error| error.to_string())?;
    validate(&incoming, Some(&spec), config.validation.mode).map_err(|error| error.to_string())?;
    let plan = reconcile(&incoming, &existing, &spec, &config.reconcile)
        .map_err(|error| error.to_string())?;
    serde_json::to_string(&plan).map_err(|error| error.to_string())
}

/// Generates the default layout as a JSON array of space records.
#[wasm_bindgen]
pub fn generate_layout_json(spec_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json).map_err(|error| JsValue::from_str(&error))?;
    generate(spec_json, options).map_err(|error| JsValue::from_str(&error))
}

/// Returns the violations found, as a JSON array. An empty array means valid.
#[wasm_bindgen]
pub fn validate_layout_json(
    spaces_json: &str,
    spec_json: Option<String>,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = parse_options(options_json).map_err(|error| JsValue::from_str(&error))?;
    check(spaces_json, spec_json.as_deref(), options).map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn reconcile_layout_json(
    incoming_json: &str,
    existing_json: &str,
    spec_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = parse_options(options_json).map_err(|error| JsValue::from_str(&error))?;
    diff(incoming_json, existing_json, spec_json, options).map_err(|error| JsValue::from_str(&error))
}
