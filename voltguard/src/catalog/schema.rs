//! Part record types, one per component kind.
//!
//! A record's `type` tag is kept as the raw string from the file so kind
//! mismatches can report exactly what was found.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::spec::I2cAddress;

/// Closed set of catalog part kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    MotorDriver,
    Motor,
    Mcu,
    I2cSensor,
}

impl PartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PartKind::MotorDriver => "motor_driver",
            PartKind::Motor => "motor",
            PartKind::Mcu => "mcu",
            PartKind::I2cSensor => "i2c_sensor",
        }
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Motor driver record, e.g. `drivers/tb6612fng.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverPart {
    pub part_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub mpn: String,
    pub motor_driver: DriverDefaults,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverDefaults {
    pub channels: i64,
    pub motor_supply_min_v: f64,
    pub motor_supply_max_v: f64,
    pub logic_voltage_min_v: f64,
    pub logic_voltage_max_v: f64,
    pub continuous_per_channel_a: f64,
    pub peak_per_channel_a: f64,
}

/// Motor record, e.g. `motors/n20_micro_6v.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorPart {
    pub part_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub mpn: String,
    pub motor: MotorDefaults,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorDefaults {
    pub voltage_min_v: f64,
    pub voltage_max_v: f64,
    pub nominal_current_a: f64,
    pub stall_current_a: f64,
}

/// MCU record, e.g. `mcus/esp32s3.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct McuPart {
    pub part_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub mpn: String,
    pub mcu: McuDefaults,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct McuDefaults {
    pub logic_voltage_v: f64,
    pub max_gpio_current_ma: f64,
}

/// I2C sensor record, e.g. `sensors/mpu6050.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct I2cSensorPart {
    pub part_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub mpn: String,
    pub i2c_device: I2cDeviceDefaults,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct I2cDeviceDefaults {
    pub address_hex: I2cAddress,
}
