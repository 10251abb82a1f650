//! Ordered-source part lookup.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::builtin;
use super::schema::{DriverPart, I2cSensorPart, McuPart, MotorPart, PartKind};

/// One search location, either a directory on disk or the embedded
/// built-in library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartSource {
    Dir(PathBuf),
    Builtin,
}

impl fmt::Display for PartSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartSource::Dir(dir) => write!(f, "{}", dir.display()),
            PartSource::Builtin => f.write_str("built-in library"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("part {id:?} not found; searched: {}", fmt_searched(.searched))]
    NotFound { id: String, searched: Vec<String> },
    #[error("part {id:?} has type {found:?}, expected {expected:?}")]
    KindMismatch {
        id: String,
        expected: &'static str,
        found: String,
    },
    #[error("read part {id:?} from {}", .path.display())]
    Io {
        id: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse part {id:?} from {origin}")]
    Parse {
        id: String,
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },
}

fn fmt_searched(searched: &[String]) -> String {
    if searched.is_empty() {
        "none".to_string()
    } else {
        searched.join(", ")
    }
}

/// Loads part records from an ordered list of sources; the first source
/// that yields the id wins. Lookups are idempotent and perform no caching.
#[derive(Debug, Clone, Default)]
pub struct PartStore {
    sources: Vec<PartSource>,
}

impl PartStore {
    /// A store over explicit directories only (no built-in library).
    pub fn from_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        PartStore {
            sources: dirs.into_iter().map(|d| PartSource::Dir(d.into())).collect(),
        }
    }

    /// A store over the embedded built-in library only.
    pub fn builtin() -> Self {
        PartStore {
            sources: vec![PartSource::Builtin],
        }
    }

    /// The standard layout: `<project_root>/parts` first, then the embedded
    /// built-in library, then any caller-supplied directories (CLI flags,
    /// environment) in the order given.
    pub fn with_layout(project_root: &Path, extra_dirs: &[PathBuf]) -> Self {
        let mut sources = vec![
            PartSource::Dir(project_root.join("parts")),
            PartSource::Builtin,
        ];
        sources.extend(extra_dirs.iter().cloned().map(PartSource::Dir));
        PartStore { sources }
    }

    pub fn sources(&self) -> &[PartSource] {
        &self.sources
    }

    fn searched(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.to_string()).collect()
    }

    /// Load a motor driver record, e.g. `drivers/tb6612fng`.
    pub fn load_driver(&self, id: &str) -> Result<DriverPart, CatalogError> {
        let part: DriverPart = self.load_record(id)?;
        check_kind(id, PartKind::MotorDriver, &part.kind)?;
        Ok(part)
    }

    /// Load a motor record, e.g. `motors/n20_micro_6v`.
    pub fn load_motor(&self, id: &str) -> Result<MotorPart, CatalogError> {
        let part: MotorPart = self.load_record(id)?;
        check_kind(id, PartKind::Motor, &part.kind)?;
        Ok(part)
    }

    /// Load an MCU record, e.g. `mcus/esp32s3`.
    pub fn load_mcu(&self, id: &str) -> Result<McuPart, CatalogError> {
        let part: McuPart = self.load_record(id)?;
        check_kind(id, PartKind::Mcu, &part.kind)?;
        Ok(part)
    }

    /// Load an I2C sensor record, e.g. `sensors/mpu6050`.
    pub fn load_i2c_sensor(&self, id: &str) -> Result<I2cSensorPart, CatalogError> {
        let part: I2cSensorPart = self.load_record(id)?;
        check_kind(id, PartKind::I2cSensor, &part.kind)?;
        Ok(part)
    }

    fn load_record<T: DeserializeOwned>(&self, id: &str) -> Result<T, CatalogError> {
        for source in &self.sources {
            let (text, origin) = match source {
                PartSource::Dir(dir) => {
                    let path = dir.join(format!("{}.yaml", id));
                    match std::fs::read_to_string(&path) {
                        Ok(text) => (text, path.display().to_string()),
                        Err(e) if e.kind() == io::ErrorKind::NotFound => {
                            tracing::trace!(id, path = %path.display(), "part not at source");
                            continue;
                        }
                        Err(e) => {
                            return Err(CatalogError::Io {
                                id: id.to_string(),
                                path,
                                source: e,
                            })
                        }
                    }
                }
                PartSource::Builtin => match builtin::part_source(id) {
                    Some(text) => (text.to_string(), "built-in library".to_string()),
                    None => continue,
                },
            };
            tracing::debug!(id, %origin, "loaded part record");
            return serde_yaml::from_str(&text).map_err(|e| CatalogError::Parse {
                id: id.to_string(),
                origin,
                source: e,
            });
        }
        Err(CatalogError::NotFound {
            id: id.to_string(),
            searched: self.searched(),
        })
    }
}

fn check_kind(id: &str, expected: PartKind, found: &str) -> Result<(), CatalogError> {
    if found != expected.as_str() {
        return Err(CatalogError::KindMismatch {
            id: id.to_string(),
            expected: expected.as_str(),
            found: found.to_string(),
        });
    }
    Ok(())
}
