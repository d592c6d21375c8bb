//! Output formatting for CLI commands
//!
//! Every command prints one JSON object carrying a `success` flag next to its
//! own fields. `breadcrumbs --html` is the only exception.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct OutputContext {
    /// Files under this directory are reported relative to it
    cwd: PathBuf,
}

impl OutputContext {
    pub fn new(cwd: PathBuf) -> Self {
        Self { cwd }
    }

    pub fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.cwd)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    pub fn print_success_flat<T: Serialize>(&self, data: T) {
        self.print_report(true, data);
    }

    /// Flat report whose `success` flag reflects the outcome
    pub fn print_report<T: Serialize>(&self, success: bool, data: T) {
        print_json(&flatten(success, data));
    }

    pub fn print_error(&self, message: &str) {
        print_json(&json!({ "success": false, "error": message }));
    }

    /// Raw text, for rendered views
    pub fn emit(&self, text: &str) {
        println!("{text}");
    }
}

fn flatten<T: Serialize>(success: bool, data: T) -> Value {
    let mut value = match serde_json::to_value(data) {
        Ok(Value::Object(map)) => Value::Object(map),
        Ok(other) => json!({ "data": other }),
        Err(e) => json!({ "error": e.to_string() }),
    };
    if let Some(obj) = value.as_object_mut() {
        obj.insert("success".to_string(), Value::Bool(success));
    }
    value
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}
