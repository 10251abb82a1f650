//! Typed data model for a robot electrical spec.
//!
//! Fields left out of the YAML decode to zero/empty, which the resolver
//! treats as "unset, fill from the parts catalog". Explicit values always
//! win over catalog defaults.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Root aggregate for one robot's electrical stack.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotSpec {
    pub name: String,
    pub power: Power,
    pub motors: Vec<Motor>,
    #[serde(rename = "motor_driver")]
    pub driver: MotorDriver,
    pub mcu: Mcu,
    pub i2c_buses: Vec<I2cBus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Power {
    pub battery: Battery,
    /// Main logic rail after regulation.
    #[serde(rename = "logic_rail")]
    pub rail: Rail,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Battery {
    /// e.g. "Li-ion"
    pub chemistry: String,
    /// Nominal pack voltage.
    pub voltage_v: f64,
    pub max_current_a: f64,
    pub capacity_ah: f64,
    pub c_rating: f64,
    pub max_discharge_a: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rail {
    /// e.g. 5.0
    pub voltage_v: f64,
    /// Regulator output capability.
    pub max_current_a: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Motor {
    /// Catalog reference, e.g. "motors/n20_micro_6v".
    pub part: String,
    pub name: String,
    pub count: i64,
    pub voltage_min_v: f64,
    pub voltage_max_v: f64,
    pub stall_current_a: f64,
    pub nominal_current_a: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorDriver {
    /// Catalog reference, e.g. "drivers/tb6612fng".
    pub part: String,
    pub name: String,
    pub motor_supply_min_v: f64,
    pub motor_supply_max_v: f64,
    pub continuous_per_channel_a: f64,
    pub peak_per_channel_a: f64,
    pub channels: i64,
    pub logic_voltage_min_v: f64,
    pub logic_voltage_max_v: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Mcu {
    /// Catalog reference, e.g. "mcus/esp32s3".
    pub part: String,
    pub name: String,
    /// Usually 3.3 for ESP32-class parts.
    pub logic_voltage_v: f64,
    pub max_gpio_current_ma: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct I2cBus {
    pub name: String,
    pub devices: Vec<I2cDevice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct I2cDevice {
    /// Catalog reference, e.g. "sensors/mpu6050".
    pub part: String,
    pub name: String,
    pub address_hex: I2cAddress,
}

/// 7/10-bit I2C address, accepted as a decimal or 0x-prefixed literal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct I2cAddress(pub u16);

impl I2cAddress {
    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for I2cAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

impl From<u16> for I2cAddress {
    fn from(raw: u16) -> Self {
        I2cAddress(raw)
    }
}

impl<'de> Deserialize<'de> for I2cAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AddressVisitor;

        impl<'de> Visitor<'de> for AddressVisitor {
            type Value = I2cAddress;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an i2c address as an integer or a decimal/0x-prefixed string")
            }

            fn visit_u64<E: de::Error>(self, raw: u64) -> Result<Self::Value, E> {
                u16::try_from(raw)
                    .map(I2cAddress)
                    .map_err(|_| E::custom(format!("i2c address {} out of range", raw)))
            }

            fn visit_i64<E: de::Error>(self, raw: i64) -> Result<Self::Value, E> {
                u16::try_from(raw)
                    .map(I2cAddress)
                    .map_err(|_| E::custom(format!("i2c address {} out of range", raw)))
            }

            fn visit_str<E: de::Error>(self, raw: &str) -> Result<Self::Value, E> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(E::custom("i2c address is empty"));
                }
                let parsed = if let Some(hex) = trimmed
                    .strip_prefix("0x")
                    .or_else(|| trimmed.strip_prefix("0X"))
                {
                    u16::from_str_radix(hex, 16)
                } else {
                    trimmed.parse::<u16>()
                };
                parsed
                    .map(I2cAddress)
                    .map_err(|_| E::custom(format!("invalid i2c address {:?}", raw)))
            }
        }

        deserializer.deserialize_any(AddressVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_minimal_spec_defaults_to_zero_values() {
        let spec: RobotSpec = serde_yaml::from_str("name: bot\n").unwrap();
        assert_eq!(spec.name, "bot");
        assert_eq!(spec.power.battery.voltage_v, 0.0);
        assert_eq!(spec.driver.channels, 0);
        assert!(spec.motors.is_empty());
        assert!(spec.i2c_buses.is_empty());
    }

    #[test]
    fn decode_i2c_address_forms() {
        #[derive(Deserialize)]
        struct Holder {
            address_hex: I2cAddress,
        }

        let hex: Holder = serde_yaml::from_str("address_hex: \"0x68\"").unwrap();
        assert_eq!(hex.address_hex, I2cAddress(0x68));

        let dec: Holder = serde_yaml::from_str("address_hex: 104").unwrap();
        assert_eq!(dec.address_hex, I2cAddress(0x68));

        let dec_str: Holder = serde_yaml::from_str("address_hex: \"104\"").unwrap();
        assert_eq!(dec_str.address_hex, I2cAddress(0x68));
    }

    #[test]
    fn decode_i2c_address_rejects_garbage() {
        #[derive(Deserialize)]
        struct Holder {
            #[allow(dead_code)]
            address_hex: I2cAddress,
        }

        assert!(serde_yaml::from_str::<Holder>("address_hex: \"zz\"").is_err());
        assert!(serde_yaml::from_str::<Holder>("address_hex: \"\"").is_err());
        assert!(serde_yaml::from_str::<Holder>("address_hex: 70000").is_err());
    }

    #[test]
    fn decode_full_spec() {
        let yaml = r#"
name: rover
power:
  battery:
    chemistry: Li-ion
    voltage_v: 11.1
    capacity_ah: 2.2
    c_rating: 10
  logic_rail:
    voltage_v: 3.3
    max_current_a: 1.5
motors:
  - part: motors/n20_micro_6v
    name: left
    count: 1
motor_driver:
  part: drivers/tb6612fng
mcu:
  part: mcus/esp32s3
i2c_buses:
  - name: main
    devices:
      - part: sensors/mpu6050
        address_hex: 0x68
"#;
        let spec: RobotSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.motors.len(), 1);
        assert_eq!(spec.motors[0].count, 1);
        assert_eq!(spec.driver.part, "drivers/tb6612fng");
        assert_eq!(spec.i2c_buses[0].devices[0].address_hex.value(), 0x68);
    }
}
