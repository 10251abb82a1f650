//! Layered parts catalog.
//!
//! Components in a robot spec may reference a part by id (for example
//! `drivers/tb6612fng`); the resolver pulls default field values from the
//! matching catalog record. Records are searched across an ordered list of
//! sources — most specific first — and the first source that yields the id
//! wins entirely; field values are never mixed across sources.

pub mod builtin;
pub mod schema;
pub mod store;

pub use schema::{
    DriverDefaults, DriverPart, I2cDeviceDefaults, I2cSensorPart, McuDefaults, McuPart,
    MotorDefaults, MotorPart, PartKind,
};
pub use store::{CatalogError, PartSource, PartStore};
