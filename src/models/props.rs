//! Component inputs supplied by the host on every render

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub type ChangeCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Default fixed size of the editor surface
pub const DEFAULT_WIDTH: &str = "500px";
pub const DEFAULT_HEIGHT: &str = "500px";

/// Properties of the YAML editor component
#[derive(Clone, Default)]
pub struct EditorProps {
    /// Document text. `None` while the host has nothing to show yet.
    pub value: Option<String>,
    /// Locator of the JSON schema validating this document
    pub schema_uri: String,
    /// Explicit theme name, overriding the color-scheme preference
    pub theme: Option<String>,
    pub read_only: bool,
    /// Layout overrides merged over the default size
    pub style: Style,
    pub on_change: Option<ChangeCallback>,
    pub on_validation_error: Option<Callback>,
    pub on_validation_success: Option<Callback>,
}

impl EditorProps {
    pub fn new(value: impl Into<String>, schema_uri: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            schema_uri: schema_uri.into(),
            ..Default::default()
        }
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn on_change<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_change = Some(Arc::new(f));
        self
    }

    pub fn on_validation_error<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_validation_error = Some(Arc::new(f));
        self
    }

    pub fn on_validation_success<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_validation_success = Some(Arc::new(f));
        self
    }

    /// Whether the props carry enough to create a session
    pub fn is_mountable(&self) -> bool {
        self.value.is_some() && !self.schema_uri.is_empty()
    }
}

impl fmt::Debug for EditorProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorProps")
            .field("value_len", &self.value.as_ref().map(String::len))
            .field("schema_uri", &self.schema_uri)
            .field("theme", &self.theme)
            .field("read_only", &self.read_only)
            .field("style", &self.style)
            .field("on_change", &self.on_change.is_some())
            .field("on_validation_error", &self.on_validation_error.is_some())
            .field("on_validation_success", &self.on_validation_success.is_some())
            .finish()
    }
}

/// CSS-like layout declarations, ordered by property name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Style(BTreeMap<String, String>);

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed-size layout the editor surface starts from
    pub fn editor_default() -> Self {
        Self::new()
            .set("width", DEFAULT_WIDTH)
            .set("height", DEFAULT_HEIGHT)
    }

    pub fn set(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(property.into(), value.into());
        self
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    /// `self` with every declaration of `overrides` applied on top
    pub fn merged(&self, overrides: &Style) -> Style {
        let mut merged = self.0.clone();
        merged.extend(overrides.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Style(merged)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Inline `style` attribute value
    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_merge_overrides_defaults() {
        let overrides = Style::new().set("height", "800px").set("border", "none");
        let merged = Style::editor_default().merged(&overrides);
        assert_eq!(merged.get("width"), Some("500px"));
        assert_eq!(merged.get("height"), Some("800px"));
        assert_eq!(merged.get("border"), Some("none"));
    }

    #[test]
    fn test_style_to_css() {
        assert_eq!(
            Style::editor_default().to_css(),
            "height: 500px; width: 500px"
        );
    }

    #[test]
    fn test_props_mountable() {
        assert!(EditorProps::new("", "schema.json").is_mountable());
        assert!(!EditorProps::new("a: 1", "").is_mountable());

        let props = EditorProps {
            schema_uri: "schema.json".into(),
            ..Default::default()
        };
        assert!(!props.is_mountable());
    }
}
