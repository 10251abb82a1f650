//! Voltguard - electrical compatibility validation for small robotics stacks
//!
//! This library checks a declarative robot spec (battery, logic rail, motor
//! driver, motors, MCU, I2C devices) against deterministic electrical rules
//! and reports findings with source-location context. Component fields left
//! unset in the spec are filled from a layered parts catalog before the
//! rules run.
//!
//! # Quick Start
//!
//! ```no_run
//! use voltguard::{CheckOptions, SpecChecker};
//! use std::path::Path;
//!
//! let options = CheckOptions::default();
//! let result = SpecChecker::check_file(Path::new("robot.yaml"), options).unwrap();
//!
//! for finding in &result.report.findings {
//!     println!("{} {}: {}", finding.severity, finding.code, finding.message);
//! }
//! ```
//!
//! # Features
//!
//! - **Layered parts catalog**: project overrides, built-in library,
//!   extra directories; first match wins
//! - **Field-by-field resolution**: explicit spec values always beat
//!   catalog defaults
//! - **Deterministic rules**: seven electrical checks in a fixed order
//! - **Source locations**: findings point back at the YAML that caused them

pub mod catalog;
pub mod core;
pub mod document;
pub mod location;
pub mod resolve;
pub mod rules;
pub mod spec;

// Re-export main types
pub use crate::core::{CheckOptions, CheckResult, SpecChecker, VoltguardError};
pub use catalog::{CatalogError, PartKind, PartSource, PartStore};
pub use location::{Location, LocationIndex};
pub use resolve::{resolve_all, ResolveError};
pub use rules::{Finding, Report, Rule, RuleEngine, Severity, Summary};
pub use spec::RobotSpec;

/// Parse spec text into the position-annotated document tree
/// (convenience wrapper).
pub fn parse_document(source: &str) -> Result<document::DocNode, VoltguardError> {
    document::parse_str(source).map_err(VoltguardError::from)
}

/// Decode spec text into the typed model (convenience wrapper).
pub fn parse_spec(source: &str) -> Result<RobotSpec, VoltguardError> {
    serde_yaml::from_str(source).map_err(VoltguardError::from)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        CheckOptions, CheckResult, Finding, PartStore, Report, RuleEngine, Severity, SpecChecker,
        Summary, VoltguardError,
    };
}
