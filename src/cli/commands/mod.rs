//! Command implementations for yamlpane
//!
//! Each command is implemented in its own module.

pub mod breadcrumbs;
pub mod check;
pub mod config;
pub mod doctor;
