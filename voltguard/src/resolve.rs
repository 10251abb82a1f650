//! Merges explicit spec values with catalog defaults.
//!
//! Resolution runs independently per component group (MCU, driver, each
//! motor, each I2C bus's devices); the first failure aborts the whole run.
//! Explicit non-zero/non-empty spec fields always win over catalog
//! defaults; the merge is field-by-field, never whole-record replacement.

use thiserror::Error;

use crate::catalog::{CatalogError, PartKind, PartStore};
use crate::spec::{I2cDevice, Mcu, Motor, MotorDriver, RobotSpec};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{path}: load {kind} part {id:?}")]
    Part {
        path: String,
        kind: PartKind,
        id: String,
        #[source]
        source: CatalogError,
    },
    #[error("{path} missing after resolving (no part defaults and no explicit value)")]
    Missing { path: String },
    #[error("{path} must be > 0 after resolving")]
    NonPositive { path: String },
}

impl ResolveError {
    /// Dotted/bracketed path of the component or field that failed.
    pub fn path(&self) -> &str {
        match self {
            ResolveError::Part { path, .. }
            | ResolveError::Missing { path }
            | ResolveError::NonPositive { path } => path,
        }
    }
}

/// Produce a fully-populated copy of `spec`, pulling defaults from `store`
/// for every component that references a catalog part.
pub fn resolve_all(spec: &RobotSpec, store: &PartStore) -> Result<RobotSpec, ResolveError> {
    let mut resolved = spec.clone();

    resolved.mcu = resolve_mcu(&spec.mcu, store)?;
    resolved.driver = resolve_driver(&spec.driver, store)?;

    resolved.motors = spec
        .motors
        .iter()
        .enumerate()
        .map(|(i, m)| resolve_motor(m, i, store))
        .collect::<Result<_, _>>()?;

    for (b, bus) in resolved.i2c_buses.iter_mut().enumerate() {
        for (d, device) in bus.devices.iter_mut().enumerate() {
            *device = resolve_i2c_device(device, b, d, store)?;
        }
    }

    tracing::debug!(
        motors = resolved.motors.len(),
        buses = resolved.i2c_buses.len(),
        "resolved spec"
    );
    Ok(resolved)
}

fn resolve_mcu(input: &Mcu, store: &PartStore) -> Result<Mcu, ResolveError> {
    let mut out = input.clone();

    if !input.part.is_empty() {
        let part = store.load_mcu(&input.part).map_err(|e| ResolveError::Part {
            path: "mcu.part".to_string(),
            kind: PartKind::Mcu,
            id: input.part.clone(),
            source: e,
        })?;
        if out.logic_voltage_v == 0.0 {
            out.logic_voltage_v = part.mcu.logic_voltage_v;
        }
        if out.max_gpio_current_ma == 0.0 {
            out.max_gpio_current_ma = part.mcu.max_gpio_current_ma;
        }
        if out.name.is_empty() {
            out.name = part.name;
        }
    }

    if out.logic_voltage_v == 0.0 {
        return Err(ResolveError::Missing {
            path: "mcu.logic_voltage_v".to_string(),
        });
    }

    Ok(out)
}

fn resolve_driver(input: &MotorDriver, store: &PartStore) -> Result<MotorDriver, ResolveError> {
    let mut out = input.clone();

    if !input.part.is_empty() {
        let part = store
            .load_driver(&input.part)
            .map_err(|e| ResolveError::Part {
                path: "motor_driver.part".to_string(),
                kind: PartKind::MotorDriver,
                id: input.part.clone(),
                source: e,
            })?;
        let d = part.motor_driver;
        if out.channels == 0 {
            out.channels = d.channels;
        }
        if out.motor_supply_min_v == 0.0 {
            out.motor_supply_min_v = d.motor_supply_min_v;
        }
        if out.motor_supply_max_v == 0.0 {
            out.motor_supply_max_v = d.motor_supply_max_v;
        }
        if out.logic_voltage_min_v == 0.0 {
            out.logic_voltage_min_v = d.logic_voltage_min_v;
        }
        if out.logic_voltage_max_v == 0.0 {
            out.logic_voltage_max_v = d.logic_voltage_max_v;
        }
        if out.continuous_per_channel_a == 0.0 {
            out.continuous_per_channel_a = d.continuous_per_channel_a;
        }
        if out.peak_per_channel_a == 0.0 {
            out.peak_per_channel_a = d.peak_per_channel_a;
        }
        if out.name.is_empty() {
            out.name = part.name;
        }
    }

    // Completeness after merging.
    if out.channels <= 0 {
        return Err(ResolveError::NonPositive {
            path: "motor_driver.channels".to_string(),
        });
    }
    if out.motor_supply_min_v == 0.0 {
        return Err(ResolveError::Missing {
            path: "motor_driver.motor_supply_min_v".to_string(),
        });
    }
    if out.motor_supply_max_v == 0.0 {
        return Err(ResolveError::Missing {
            path: "motor_driver.motor_supply_max_v".to_string(),
        });
    }
    if out.logic_voltage_min_v == 0.0 {
        return Err(ResolveError::Missing {
            path: "motor_driver.logic_voltage_min_v".to_string(),
        });
    }
    if out.logic_voltage_max_v == 0.0 {
        return Err(ResolveError::Missing {
            path: "motor_driver.logic_voltage_max_v".to_string(),
        });
    }
    if out.peak_per_channel_a == 0.0 {
        return Err(ResolveError::Missing {
            path: "motor_driver.peak_per_channel_a".to_string(),
        });
    }

    Ok(out)
}

fn resolve_motor(input: &Motor, index: usize, store: &PartStore) -> Result<Motor, ResolveError> {
    let mut out = input.clone();

    if !input.part.is_empty() {
        let part = store
            .load_motor(&input.part)
            .map_err(|e| ResolveError::Part {
                path: format!("motors[{}].part", index),
                kind: PartKind::Motor,
                id: input.part.clone(),
                source: e,
            })?;
        let m = part.motor;
        if out.voltage_min_v == 0.0 {
            out.voltage_min_v = m.voltage_min_v;
        }
        if out.voltage_max_v == 0.0 {
            out.voltage_max_v = m.voltage_max_v;
        }
        if out.nominal_current_a == 0.0 {
            out.nominal_current_a = m.nominal_current_a;
        }
        if out.stall_current_a == 0.0 {
            out.stall_current_a = m.stall_current_a;
        }
        if out.name.is_empty() {
            out.name = part.name;
        }
    }

    if out.count <= 0 {
        return Err(ResolveError::NonPositive {
            path: format!("motors[{}].count", index),
        });
    }
    if out.stall_current_a == 0.0 {
        return Err(ResolveError::Missing {
            path: format!("motors[{}].stall_current_a", index),
        });
    }

    Ok(out)
}

fn resolve_i2c_device(
    input: &I2cDevice,
    bus: usize,
    index: usize,
    store: &PartStore,
) -> Result<I2cDevice, ResolveError> {
    let mut out = input.clone();

    if !input.part.is_empty() {
        let part = store
            .load_i2c_sensor(&input.part)
            .map_err(|e| ResolveError::Part {
                path: format!("i2c_buses[{}].devices[{}].part", bus, index),
                kind: PartKind::I2cSensor,
                id: input.part.clone(),
                source: e,
            })?;
        if out.address_hex.value() == 0 {
            out.address_hex = part.i2c_device.address_hex;
        }
        if out.name.is_empty() {
            out.name = part.name;
        }
    }

    Ok(out)
}
