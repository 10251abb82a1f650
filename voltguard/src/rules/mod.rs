//! Deterministic rule engine and report model.
//!
//! Rules are pure functions of the resolved spec and the location index:
//! they share no mutable state, never stop on each other's findings, and
//! run in a fixed registration order. The output ordering is part of the
//! engine's contract.

pub mod checks;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::location::{Location, LocationIndex};
use crate::spec::RobotSpec;

pub use checks::{
    BatteryPeakCurrentRule, DriverChannelCapacityRule, DriverCurrentHeadroomRule,
    LogicLevelValidityRule, LogicVoltageCompatRule, MotorSupplyVoltageRule, RailCurrentBudgetRule,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warn,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("ERROR"),
            Severity::Warn => f.write_str("WARN"),
            Severity::Info => f.write_str("INFO"),
        }
    }
}

/// One diagnostic emitted by a rule.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    #[serde(rename = "id")]
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub path: Option<String>,
    pub location: Option<Location>,
}

/// Ordered collection of all findings from one validation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub findings: Vec<Finding>,
}

impl Report {
    pub fn has_errors(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity == Severity::Error)
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for finding in &self.findings {
            match finding.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warn => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

pub trait Rule: Send + Sync {
    fn id(&self) -> &'static str;
    fn check(&self, spec: &RobotSpec, locations: &LocationIndex) -> Vec<Finding>;
}

pub struct RuleEngine {
    rules: Vec<Arc<dyn Rule>>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// The seven electrical checks, in their fixed evaluation order.
    pub fn with_default_rules() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Arc::new(DriverChannelCapacityRule));
        engine.add_rule(Arc::new(MotorSupplyVoltageRule));
        engine.add_rule(Arc::new(DriverCurrentHeadroomRule));
        engine.add_rule(Arc::new(LogicVoltageCompatRule));
        engine.add_rule(Arc::new(RailCurrentBudgetRule));
        engine.add_rule(Arc::new(LogicLevelValidityRule));
        engine.add_rule(Arc::new(BatteryPeakCurrentRule));
        engine
    }

    pub fn add_rule(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn run(&self, spec: &RobotSpec, locations: &LocationIndex) -> Report {
        let mut findings = Vec::new();
        for rule in &self.rules {
            findings.extend(rule.check(spec, locations));
        }
        Report { findings }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}
