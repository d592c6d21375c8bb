//! Service layer for yamlpane

pub mod breadcrumbs;
pub mod config;
pub mod language;
pub mod problems;

pub use config::{ConfigService, DefaultConfigService};
pub use language::{LanguageService, LspLanguageService, MarkerListener};
