//! yaml-language-server settings
//!
//! The server reads its options from the `yaml` section, pushed through
//! `workspace/didChangeConfiguration` and pulled through
//! `workspace/configuration`. Schemas map a schema URI to the glob list of
//! documents it validates.

use serde_json::{Map, Value, json};

use crate::environment::DiagnosticsOptions;

/// Full settings object, `yaml` section included
pub fn yaml_settings(options: &DiagnosticsOptions) -> Value {
    json!({ "yaml": yaml_section(options) })
}

/// Contents of the `yaml` section
pub fn yaml_section(options: &DiagnosticsOptions) -> Value {
    let mut schemas = Map::new();
    for association in &options.schemas {
        let globs = schemas
            .entry(association.uri.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = globs {
            list.extend(association.file_match.iter().cloned().map(Value::String));
        }
    }

    json!({
        "validate": options.validate,
        "hover": options.hover,
        "completion": options.completion,
        "format": {
            "enable": options.format,
            "singleQuote": false,
            "bracketSpacing": true,
            "proseWrap": "preserve"
        },
        "schemaStore": {
            "enable": false
        },
        "schemaDownload": {
            "enable": options.enable_schema_request
        },
        "schemas": schemas,
        "customTags": [],
        "maxItemsComputed": 5000
    })
}

/// Answer a `workspace/configuration` item for `section`
pub fn configuration_for(settings: &Value, section: Option<&str>) -> Value {
    match section {
        None => settings.clone(),
        Some(path) => path
            .split('.')
            .try_fold(settings, |value, key| value.get(key))
            .cloned()
            .unwrap_or(Value::Null),
    }
}
