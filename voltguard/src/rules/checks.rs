//! The seven electrical compatibility checks.

use crate::location::LocationIndex;
use crate::rules::{Finding, Rule, Severity};
use crate::spec::RobotSpec;

/// Continuous rating must exceed nominal draw by this factor before the
/// headroom warning clears.
const CONTINUOUS_MARGIN: f64 = 1.25;

/// MCU logic may differ from the rail by at most this much before a
/// level-shifting warning fires.
const MCU_RAIL_TOLERANCE_V: f64 = 0.25;

/// Peak draw at or above this fraction of the battery's effective max
/// triggers the low-margin warning.
const BATTERY_MARGIN_FRACTION: f64 = 0.8;

fn finding(
    locations: &LocationIndex,
    path: &str,
    severity: Severity,
    code: &str,
    message: String,
) -> Finding {
    Finding {
        code: code.to_string(),
        severity,
        message,
        path: Some(path.to_string()),
        location: locations.find(path).cloned(),
    }
}

/// Sum of motor unit counts must fit the driver's channel count.
/// Always emits exactly one finding.
pub struct DriverChannelCapacityRule;

impl Rule for DriverChannelCapacityRule {
    fn id(&self) -> &'static str {
        "driver_channel_capacity"
    }

    fn check(&self, spec: &RobotSpec, locations: &LocationIndex) -> Vec<Finding> {
        let total_motors: i64 = spec.motors.iter().map(|m| m.count).sum();
        let path = "motor_driver.channels";

        if spec.driver.channels <= 0 {
            return vec![finding(
                locations,
                path,
                Severity::Error,
                "DRV_CHANNELS_INVALID",
                "motor_driver.channels must be > 0".to_string(),
            )];
        }
        if total_motors > spec.driver.channels {
            return vec![finding(
                locations,
                path,
                Severity::Error,
                "DRV_CHANNELS_INSUFFICIENT",
                format!(
                    "motors require {} channels but motor_driver.channels is {}",
                    total_motors, spec.driver.channels
                ),
            )];
        }
        vec![finding(
            locations,
            path,
            Severity::Info,
            "DRV_CHANNELS_OK",
            format!(
                "driver channels OK: {} motor(s) mapped to {} available channel(s)",
                total_motors, spec.driver.channels
            ),
        )]
    }
}

/// Battery voltage must sit inside the driver's motor-supply window.
pub struct MotorSupplyVoltageRule;

impl Rule for MotorSupplyVoltageRule {
    fn id(&self) -> &'static str {
        "motor_supply_voltage"
    }

    fn check(&self, spec: &RobotSpec, locations: &LocationIndex) -> Vec<Finding> {
        let bat_v = spec.power.battery.voltage_v;
        let path = "power.battery.voltage_v";

        if bat_v < 0.0 {
            return vec![finding(
                locations,
                path,
                Severity::Error,
                "BAT_V_INVALID",
                "power.battery.voltage_v must be > 0".to_string(),
            )];
        }
        if bat_v < spec.driver.motor_supply_min_v || bat_v > spec.driver.motor_supply_max_v {
            return vec![finding(
                locations,
                path,
                Severity::Error,
                "DRV_SUPPLY_RANGE",
                format!(
                    "battery {:.2}V outside motor_driver motor supply range [{:.2}, {:.2}]V",
                    bat_v, spec.driver.motor_supply_min_v, spec.driver.motor_supply_max_v
                ),
            )];
        }
        Vec::new()
    }
}

/// Per-motor current headroom against the driver's channel ratings.
/// A single motor may emit zero, one, or two findings.
pub struct DriverCurrentHeadroomRule;

impl Rule for DriverCurrentHeadroomRule {
    fn id(&self) -> &'static str {
        "driver_current_headroom"
    }

    fn check(&self, spec: &RobotSpec, locations: &LocationIndex) -> Vec<Finding> {
        let mut out = Vec::new();
        for (i, motor) in spec.motors.iter().enumerate() {
            if motor.count <= 0 {
                let path = format!("motors[{}].count", i);
                out.push(finding(
                    locations,
                    &path,
                    Severity::Error,
                    "MOTOR_COUNT_INVALID",
                    format!("motors[{}].count must be > 0", i),
                ));
                continue;
            }
            // Worst case per channel is stall current.
            if spec.driver.peak_per_channel_a < motor.stall_current_a {
                out.push(finding(
                    locations,
                    "motor_driver.peak_per_channel_a",
                    Severity::Error,
                    "DRV_PEAK_LT_STALL",
                    format!(
                        "motor_driver.peak_per_channel_a {:.2}A < motor {} stall {:.2}A (per channel)",
                        spec.driver.peak_per_channel_a, motor.name, motor.stall_current_a
                    ),
                ));
            }
            if spec.driver.continuous_per_channel_a < CONTINUOUS_MARGIN * motor.nominal_current_a {
                out.push(finding(
                    locations,
                    "motor_driver.continuous_per_channel_a",
                    Severity::Warn,
                    "DRV_CONT_LOW_MARGIN",
                    format!(
                        "driver continuous rating {:.2}A is below recommended {:.2}A for motor {} \
                         (nominal {:.2}A). Risk of overheating or current limiting under sustained load.",
                        spec.driver.continuous_per_channel_a,
                        CONTINUOUS_MARGIN * motor.nominal_current_a,
                        motor.name,
                        motor.nominal_current_a
                    ),
                ));
            }
        }
        out
    }
}

/// Rail voltage against the driver's logic window, then the MCU against
/// the rail. The checks are mutually exclusive.
pub struct LogicVoltageCompatRule;

impl Rule for LogicVoltageCompatRule {
    fn id(&self) -> &'static str {
        "logic_voltage_compat"
    }

    fn check(&self, spec: &RobotSpec, locations: &LocationIndex) -> Vec<Finding> {
        let rail_v = spec.power.rail.voltage_v;

        if rail_v <= 0.0 {
            return vec![finding(
                locations,
                "power.logic_rail.voltage_v",
                Severity::Error,
                "RAIL_V_INVALID",
                "power.logic_rail.voltage_v must be > 0".to_string(),
            )];
        }
        if rail_v < spec.driver.logic_voltage_min_v || rail_v > spec.driver.logic_voltage_max_v {
            return vec![finding(
                locations,
                "power.logic_rail.voltage_v",
                Severity::Error,
                "LOGIC_V_DRIVER_MISMATCH",
                format!(
                    "logic rail {:.2}V outside motor_driver logic range [{:.2}, {:.2}]V",
                    rail_v, spec.driver.logic_voltage_min_v, spec.driver.logic_voltage_max_v
                ),
            )];
        }
        if (spec.mcu.logic_voltage_v - rail_v).abs() > MCU_RAIL_TOLERANCE_V {
            return vec![finding(
                locations,
                "mcu.logic_voltage_v",
                Severity::Warn,
                "LOGIC_V_MCU_MISMATCH",
                format!(
                    "MCU logic {:.2}V differs from rail {:.2}V, check level shifting",
                    spec.mcu.logic_voltage_v, rail_v
                ),
            )];
        }
        Vec::new()
    }
}

/// Advisory only: the engine does not estimate actual rail draw yet.
pub struct RailCurrentBudgetRule;

impl Rule for RailCurrentBudgetRule {
    fn id(&self) -> &'static str {
        "rail_current_budget"
    }

    fn check(&self, spec: &RobotSpec, locations: &LocationIndex) -> Vec<Finding> {
        let rail_max = spec.power.rail.max_current_a;
        let path = "power.logic_rail.max_current_a";

        if rail_max <= 0.0 {
            return vec![finding(
                locations,
                path,
                Severity::Warn,
                "RAIL_I_UNKNOWN",
                "power.logic_rail.max_current_a not set, cannot budget logic rail current"
                    .to_string(),
            )];
        }
        vec![finding(
            locations,
            path,
            Severity::Info,
            "RAIL_BUDGET_NOTE",
            format!(
                "logic rail budget set to {:.2}A. MCU and driver logic draw is not estimated yet.",
                rail_max
            ),
        )]
    }
}

/// Validates the MCU/driver logic voltages individually before comparing
/// the MCU level against the driver's accepted window.
pub struct LogicLevelValidityRule;

impl Rule for LogicLevelValidityRule {
    fn id(&self) -> &'static str {
        "logic_level_validity"
    }

    fn check(&self, spec: &RobotSpec, locations: &LocationIndex) -> Vec<Finding> {
        let mcu_v = spec.mcu.logic_voltage_v;
        let driver_min_v = spec.driver.logic_voltage_min_v;
        let driver_max_v = spec.driver.logic_voltage_max_v;

        let mut out = Vec::new();
        if mcu_v < 0.0 {
            out.push(finding(
                locations,
                "mcu.logic_voltage_v",
                Severity::Error,
                "MCU_LOGIC_V_INVALID",
                "mcu.logic_voltage_v must be > 0".to_string(),
            ));
        }
        if driver_min_v < 0.0 {
            out.push(finding(
                locations,
                "motor_driver.logic_voltage_min_v",
                Severity::Error,
                "DRV_LOGIC_MIN_V_INVALID",
                "motor_driver.logic_voltage_min_v must be > 0".to_string(),
            ));
        }
        if driver_max_v < 0.0 {
            out.push(finding(
                locations,
                "motor_driver.logic_voltage_max_v",
                Severity::Error,
                "DRV_LOGIC_MAX_V_INVALID",
                "motor_driver.logic_voltage_max_v must be > 0".to_string(),
            ));
        }
        if driver_min_v > 0.0 && driver_max_v > 0.0 && driver_min_v > driver_max_v {
            out.push(finding(
                locations,
                "motor_driver.logic_voltage_min_v",
                Severity::Error,
                "DRV_LOGIC_RANGE_INVALID",
                "motor_driver.logic_voltage_min_v must be <= motor_driver.logic_voltage_max_v"
                    .to_string(),
            ));
        }
        if !out.is_empty() {
            return out;
        }
        // Zero means genuinely unset; validity passed trivially.
        if mcu_v == 0.0 || driver_min_v == 0.0 || driver_max_v == 0.0 {
            return Vec::new();
        }

        if mcu_v < driver_min_v || mcu_v > driver_max_v {
            return vec![finding(
                locations,
                "mcu.logic_voltage_v",
                Severity::Error,
                "LOGIC_LEVEL_MISMATCH",
                format!(
                    "MCU logic {:.2}V outside driver logic window [{:.2}, {:.2}]V",
                    mcu_v, driver_min_v, driver_max_v
                ),
            )];
        }
        Vec::new()
    }
}

/// Total stall draw against the battery's effective max discharge current.
///
/// The effective max comes from the first available source, in priority
/// order: explicit max-discharge current, capacity times C-rating, flat
/// max-current figure. The finding's path points at whichever field won.
pub struct BatteryPeakCurrentRule;

impl Rule for BatteryPeakCurrentRule {
    fn id(&self) -> &'static str {
        "battery_peak_current"
    }

    fn check(&self, spec: &RobotSpec, locations: &LocationIndex) -> Vec<Finding> {
        let battery = &spec.power.battery;

        let (battery_max_a, source_path, source_detail) = if battery.max_discharge_a > 0.0 {
            (
                battery.max_discharge_a,
                "power.battery.max_discharge_a",
                "max_discharge_a override".to_string(),
            )
        } else if battery.capacity_ah > 0.0 && battery.c_rating > 0.0 {
            (
                battery.capacity_ah * battery.c_rating,
                "power.battery.c_rating",
                format!("{:.2}Ah * {:.2}C", battery.capacity_ah, battery.c_rating),
            )
        } else if battery.max_current_a > 0.0 {
            (
                battery.max_current_a,
                "power.battery.max_current_a",
                "max_current_a".to_string(),
            )
        } else {
            return Vec::new();
        };

        let peak_current_a: f64 = spec
            .motors
            .iter()
            .filter(|m| m.stall_current_a > 0.0 && m.count > 0)
            .map(|m| m.stall_current_a * m.count as f64)
            .sum();
        if battery_max_a <= 0.0 || peak_current_a <= 0.0 {
            return Vec::new();
        }

        if peak_current_a > battery_max_a {
            return vec![finding(
                locations,
                source_path,
                Severity::Error,
                "BATT_PEAK_OVER_C",
                format!(
                    "Peak current {:.2}A exceeds battery max {:.2}A ({})",
                    peak_current_a, battery_max_a, source_detail
                ),
            )];
        }
        if peak_current_a >= battery_max_a * BATTERY_MARGIN_FRACTION {
            return vec![finding(
                locations,
                source_path,
                Severity::Warn,
                "BATT_PEAK_MARGIN_LOW",
                format!(
                    "Peak current {:.2}A is close to battery max {:.2}A ({})",
                    peak_current_a, battery_max_a, source_detail
                ),
            )];
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Report, RuleEngine};
    use crate::spec::{Battery, Mcu, Motor, MotorDriver, Power, Rail};

    fn base_spec() -> RobotSpec {
        RobotSpec {
            power: Power {
                battery: Battery {
                    voltage_v: 12.0,
                    ..Battery::default()
                },
                rail: Rail {
                    voltage_v: 5.0,
                    max_current_a: 1.0,
                },
            },
            mcu: Mcu {
                logic_voltage_v: 5.0,
                ..Mcu::default()
            },
            driver: MotorDriver {
                channels: 2,
                motor_supply_min_v: 6.0,
                motor_supply_max_v: 16.0,
                logic_voltage_min_v: 4.5,
                logic_voltage_max_v: 5.5,
                continuous_per_channel_a: 2.0,
                peak_per_channel_a: 6.0,
                ..MotorDriver::default()
            },
            motors: vec![Motor {
                name: "M".to_string(),
                count: 2,
                nominal_current_a: 1.0,
                stall_current_a: 5.0,
                ..Motor::default()
            }],
            ..RobotSpec::default()
        }
    }

    fn run(spec: &RobotSpec) -> Report {
        RuleEngine::with_default_rules().run(spec, &LocationIndex::empty())
    }

    fn codes(report: &Report) -> Vec<&str> {
        report.findings.iter().map(|f| f.code.as_str()).collect()
    }

    fn assert_codes(spec: &RobotSpec, want: &[&str], not: &[&str]) {
        let report = run(spec);
        let got = codes(&report);
        for code in want {
            assert!(got.contains(code), "expected {:?} in {:?}", code, got);
        }
        for code in not {
            assert!(!got.contains(code), "did not expect {:?} in {:?}", code, got);
        }
    }

    #[test]
    fn driver_channels_invalid() {
        let mut spec = base_spec();
        spec.driver.channels = 0;
        assert_codes(
            &spec,
            &["DRV_CHANNELS_INVALID"],
            &["DRV_CHANNELS_OK", "DRV_CHANNELS_INSUFFICIENT"],
        );
    }

    #[test]
    fn driver_channels_insufficient() {
        let mut spec = base_spec();
        spec.driver.channels = 2;
        spec.motors[0].count = 3;
        let report = run(&spec);
        let f = report
            .findings
            .iter()
            .find(|f| f.code == "DRV_CHANNELS_INSUFFICIENT")
            .expect("expected DRV_CHANNELS_INSUFFICIENT");
        assert!(f.message.contains('3') && f.message.contains('2'), "got {:?}", f.message);
        assert!(!codes(&report).contains(&"DRV_CHANNELS_OK"));
    }

    #[test]
    fn driver_channels_exactly_one_finding() {
        for mutate in [
            (|_s: &mut RobotSpec| {}) as fn(&mut RobotSpec),
            |s| s.driver.channels = 0,
            |s| s.motors[0].count = 5,
        ] {
            let mut spec = base_spec();
            mutate(&mut spec);
            let report = run(&spec);
            let channel_findings = report
                .findings
                .iter()
                .filter(|f| f.code.starts_with("DRV_CHANNELS_"))
                .count();
            assert_eq!(channel_findings, 1);
        }
    }

    #[test]
    fn motor_supply_voltage() {
        let mut spec = base_spec();
        spec.power.battery.voltage_v = -1.0;
        assert_codes(&spec, &["BAT_V_INVALID"], &["DRV_SUPPLY_RANGE"]);

        let mut spec = base_spec();
        spec.power.battery.voltage_v = 20.0;
        assert_codes(&spec, &["DRV_SUPPLY_RANGE"], &["BAT_V_INVALID"]);

        assert_codes(&base_spec(), &[], &["BAT_V_INVALID", "DRV_SUPPLY_RANGE"]);
    }

    #[test]
    fn current_headroom_motor_count_invalid_skips_other_checks() {
        let mut spec = base_spec();
        spec.motors[0].count = 0;
        spec.driver.peak_per_channel_a = 1.0;
        assert_codes(
            &spec,
            &["MOTOR_COUNT_INVALID"],
            &["DRV_PEAK_LT_STALL", "DRV_CONT_LOW_MARGIN"],
        );
    }

    #[test]
    fn current_headroom_peak_and_continuous_are_independent() {
        let mut spec = base_spec();
        spec.driver.peak_per_channel_a = 3.0;
        assert_codes(&spec, &["DRV_PEAK_LT_STALL"], &["DRV_CONT_LOW_MARGIN"]);

        let mut spec = base_spec();
        spec.driver.continuous_per_channel_a = 1.0;
        assert_codes(&spec, &["DRV_CONT_LOW_MARGIN"], &["DRV_PEAK_LT_STALL"]);

        let mut spec = base_spec();
        spec.driver.peak_per_channel_a = 3.0;
        spec.driver.continuous_per_channel_a = 1.0;
        assert_codes(&spec, &["DRV_PEAK_LT_STALL", "DRV_CONT_LOW_MARGIN"], &[]);
    }

    #[test]
    fn logic_voltage_checks_are_mutually_exclusive() {
        let mut spec = base_spec();
        spec.power.rail.voltage_v = 0.0;
        assert_codes(
            &spec,
            &["RAIL_V_INVALID"],
            &["LOGIC_V_DRIVER_MISMATCH", "LOGIC_V_MCU_MISMATCH"],
        );

        let mut spec = base_spec();
        spec.power.rail.voltage_v = 7.0;
        assert_codes(
            &spec,
            &["LOGIC_V_DRIVER_MISMATCH"],
            &["RAIL_V_INVALID", "LOGIC_V_MCU_MISMATCH"],
        );

        let mut spec = base_spec();
        spec.mcu.logic_voltage_v = 3.3;
        assert_codes(
            &spec,
            &["LOGIC_V_MCU_MISMATCH"],
            &["RAIL_V_INVALID", "LOGIC_V_DRIVER_MISMATCH"],
        );

        assert_codes(
            &base_spec(),
            &[],
            &["RAIL_V_INVALID", "LOGIC_V_DRIVER_MISMATCH", "LOGIC_V_MCU_MISMATCH"],
        );
    }

    #[test]
    fn rail_budget_is_advisory() {
        let mut spec = base_spec();
        spec.power.rail.max_current_a = 0.0;
        assert_codes(&spec, &["RAIL_I_UNKNOWN"], &["RAIL_BUDGET_NOTE"]);

        assert_codes(&base_spec(), &["RAIL_BUDGET_NOTE"], &["RAIL_I_UNKNOWN"]);
    }

    #[test]
    fn logic_level_validity_errors_stop_the_mismatch_check() {
        let mut spec = base_spec();
        spec.mcu.logic_voltage_v = -1.0;
        spec.driver.logic_voltage_min_v = -2.0;
        assert_codes(
            &spec,
            &["MCU_LOGIC_V_INVALID", "DRV_LOGIC_MIN_V_INVALID"],
            &["LOGIC_LEVEL_MISMATCH"],
        );

        let mut spec = base_spec();
        spec.driver.logic_voltage_min_v = 5.5;
        spec.driver.logic_voltage_max_v = 4.5;
        assert_codes(&spec, &["DRV_LOGIC_RANGE_INVALID"], &["LOGIC_LEVEL_MISMATCH"]);
    }

    #[test]
    fn logic_level_mismatch_fires_outside_window() {
        let mut spec = base_spec();
        spec.mcu.logic_voltage_v = 1.8;
        assert_codes(&spec, &["LOGIC_LEVEL_MISMATCH"], &[]);
    }

    #[test]
    fn logic_level_unset_values_skip_the_mismatch_check() {
        let mut spec = base_spec();
        spec.driver.logic_voltage_min_v = 0.0;
        spec.driver.logic_voltage_max_v = 0.0;
        spec.mcu.logic_voltage_v = 1.8;
        assert_codes(&spec, &[], &["LOGIC_LEVEL_MISMATCH"]);
    }

    #[test]
    fn battery_peak_prefers_max_discharge_over_c_rating() {
        let mut spec = base_spec();
        spec.power.battery.max_discharge_a = 5.0;
        spec.power.battery.capacity_ah = 10.0;
        spec.power.battery.c_rating = 10.0;
        // peak = 5A stall * 2 = 10A > 5A effective max from the override
        let report = run(&spec);
        let f = report
            .findings
            .iter()
            .find(|f| f.code == "BATT_PEAK_OVER_C")
            .expect("expected BATT_PEAK_OVER_C");
        assert_eq!(f.path.as_deref(), Some("power.battery.max_discharge_a"));
    }

    #[test]
    fn battery_peak_margin_low_at_eighty_percent() {
        let mut spec = base_spec();
        spec.power.battery.capacity_ah = 2.0;
        spec.power.battery.c_rating = 5.0; // effective max 10A
        spec.motors = vec![
            Motor {
                name: "A".to_string(),
                count: 1,
                stall_current_a: 3.0,
                nominal_current_a: 0.5,
                ..Motor::default()
            },
            Motor {
                name: "B".to_string(),
                count: 1,
                stall_current_a: 3.0,
                nominal_current_a: 0.5,
                ..Motor::default()
            },
            Motor {
                name: "C".to_string(),
                count: 1,
                stall_current_a: 3.0,
                nominal_current_a: 0.5,
                ..Motor::default()
            },
        ];
        // total peak 9A, 9 >= 0.8 * 10 but not over
        let report = run(&spec);
        let got = codes(&report);
        assert!(got.contains(&"BATT_PEAK_MARGIN_LOW"), "got {:?}", got);
        assert!(!got.contains(&"BATT_PEAK_OVER_C"), "got {:?}", got);
        let f = report
            .findings
            .iter()
            .find(|f| f.code == "BATT_PEAK_MARGIN_LOW")
            .unwrap();
        assert_eq!(f.path.as_deref(), Some("power.battery.c_rating"));
    }

    #[test]
    fn battery_peak_falls_back_to_flat_max_current() {
        let mut spec = base_spec();
        spec.power.battery.max_current_a = 100.0;
        let report = run(&spec);
        // 10A peak against 100A max: well clear, no battery finding
        let got = codes(&report);
        assert!(!got.contains(&"BATT_PEAK_OVER_C"));
        assert!(!got.contains(&"BATT_PEAK_MARGIN_LOW"));
    }

    #[test]
    fn battery_peak_skips_when_no_source_or_no_draw() {
        // No capacity/c-rating/max figures at all.
        let report = run(&base_spec());
        let got = codes(&report);
        assert!(!got.contains(&"BATT_PEAK_OVER_C"));
        assert!(!got.contains(&"BATT_PEAK_MARGIN_LOW"));

        // Source present but no motor with positive stall and count.
        let mut spec = base_spec();
        spec.power.battery.max_discharge_a = 1.0;
        spec.motors[0].stall_current_a = 0.0;
        let report = run(&spec);
        let got_codes = codes(&report);
        assert!(!got_codes.contains(&"BATT_PEAK_OVER_C"));
        assert!(!got_codes.contains(&"BATT_PEAK_MARGIN_LOW"));
    }

    #[test]
    fn run_is_idempotent_and_ordered() {
        let mut spec = base_spec();
        spec.driver.peak_per_channel_a = 3.0;
        spec.power.rail.max_current_a = 0.0;

        let engine = RuleEngine::with_default_rules();
        let first = engine.run(&spec, &LocationIndex::empty());
        let second = engine.run(&spec, &LocationIndex::empty());
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );

        // Channel capacity always reports first; the rail advisory sits
        // between the headroom and logic-level groups.
        let got = codes(&first);
        assert_eq!(got[0], "DRV_CHANNELS_OK");
        let peak = got.iter().position(|c| *c == "DRV_PEAK_LT_STALL").unwrap();
        let rail = got.iter().position(|c| *c == "RAIL_I_UNKNOWN").unwrap();
        assert!(peak < rail);
    }
}
