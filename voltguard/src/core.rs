//! Core check pipeline shared by the CLI and library consumers.
//! No terminal or process-exit concerns here.

use std::path::{Path, PathBuf};

use crate::catalog::PartStore;
use crate::document;
use crate::location::LocationIndex;
use crate::resolve::{self, ResolveError};
use crate::rules::{Report, RuleEngine, Summary};
use crate::spec::RobotSpec;

#[derive(Debug, thiserror::Error)]
pub enum VoltguardError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("{0}")]
    Other(String),
}

impl From<document::DocumentError> for VoltguardError {
    fn from(e: document::DocumentError) -> Self {
        VoltguardError::Parse(e.to_string())
    }
}

impl From<serde_yaml::Error> for VoltguardError {
    fn from(e: serde_yaml::Error) -> Self {
        VoltguardError::Parse(e.to_string())
    }
}

/// Options for check runs.
#[derive(Clone, Debug, Default)]
pub struct CheckOptions {
    /// Root for the project-local `parts/` override directory; defaults to
    /// the current working directory.
    pub project_root: Option<PathBuf>,
    /// Additional part directories searched after the built-in library
    /// (CLI flags and environment, already split by the caller).
    pub parts_dirs: Vec<PathBuf>,
}

/// Result of checking one spec file.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub file: PathBuf,
    pub report: Report,
    pub summary: Summary,
}

impl CheckResult {
    pub fn has_errors(&self) -> bool {
        self.report.has_errors()
    }
}

/// Core check API: parse, resolve against the parts catalog, run rules.
pub struct SpecChecker;

impl SpecChecker {
    /// Check a spec file on disk using the standard catalog layout.
    pub fn check_file(path: &Path, options: CheckOptions) -> Result<CheckResult, VoltguardError> {
        let source = std::fs::read_to_string(path)?;
        let project_root = match options.project_root {
            Some(root) => root,
            None => std::env::current_dir()?,
        };
        let store = PartStore::with_layout(&project_root, &options.parts_dirs);
        Self::check_source(&source, path, &store)
    }

    /// Check spec text against an explicit parts store. `file` is only used
    /// to label source locations in findings.
    pub fn check_source(
        source: &str,
        file: &Path,
        store: &PartStore,
    ) -> Result<CheckResult, VoltguardError> {
        let doc = document::parse_str(source)?;
        let raw: RobotSpec = serde_yaml::from_str(source)?;
        let locations = LocationIndex::build(&doc, &file.display().to_string());

        let resolved = resolve::resolve_all(&raw, store)?;

        let report = RuleEngine::with_default_rules().run(&resolved, &locations);
        let summary = report.summary();
        tracing::debug!(
            errors = summary.errors,
            warnings = summary.warnings,
            infos = summary.infos,
            "check complete"
        );
        Ok(CheckResult {
            file: file.to_path_buf(),
            report,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN_SPEC: &str = r#"
name: bench-bot
power:
  battery:
    chemistry: Li-ion
    voltage_v: 7.4
    capacity_ah: 2.0
    c_rating: 10
  logic_rail:
    voltage_v: 3.3
    max_current_a: 1.5
motors:
  - part: motors/n20_micro_6v
    name: left
    count: 1
  - part: motors/n20_micro_6v
    name: right
    count: 1
motor_driver:
  part: drivers/tb6612fng
mcu:
  part: mcus/esp32s3
"#;

    fn builtin_store() -> PartStore {
        PartStore::with_layout(Path::new("/nonexistent"), &[])
    }

    #[test]
    fn clean_spec_passes_with_info_findings_only() {
        let result =
            SpecChecker::check_source(CLEAN_SPEC, Path::new("robot.yaml"), &builtin_store())
                .unwrap();
        assert!(!result.has_errors(), "findings: {:?}", result.report.findings);
        assert_eq!(result.summary.errors, 0);
        assert!(result.summary.infos >= 1);
    }

    #[test]
    fn findings_carry_locations_from_the_source() {
        let spec = CLEAN_SPEC.replace("voltage_v: 7.4", "voltage_v: 20.0");
        let result =
            SpecChecker::check_source(&spec, Path::new("robot.yaml"), &builtin_store()).unwrap();
        let finding = result
            .report
            .findings
            .iter()
            .find(|f| f.code == "DRV_SUPPLY_RANGE")
            .expect("expected DRV_SUPPLY_RANGE");
        let location = finding.location.as_ref().expect("expected a location");
        assert_eq!(location.file, "robot.yaml");
        assert!(location.line > 1);
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let err = SpecChecker::check_source("a: [b\n", Path::new("x.yaml"), &builtin_store())
            .unwrap_err();
        assert!(matches!(err, VoltguardError::Parse(_)), "got {:?}", err);
    }

    #[test]
    fn resolve_failure_aborts_with_no_report() {
        let spec = CLEAN_SPEC.replace("drivers/tb6612fng", "drivers/nope");
        let err = SpecChecker::check_source(&spec, Path::new("x.yaml"), &builtin_store())
            .unwrap_err();
        assert!(matches!(err, VoltguardError::Resolve(_)), "got {:?}", err);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err =
            SpecChecker::check_file(Path::new("/no/such/robot.yaml"), CheckOptions::default())
                .unwrap_err();
        assert!(matches!(err, VoltguardError::Io(_)), "got {:?}", err);
    }
}
