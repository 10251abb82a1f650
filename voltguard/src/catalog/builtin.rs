//! Built-in part library, embedded into the binary.
//!
//! Users extend or override these by dropping YAML files into a project
//! `parts/` directory or any `--parts-dir`; the embedded records are only
//! consulted when no earlier source provides the id.

/// Id and YAML source of every embedded part record.
pub const BUILTIN_PARTS: &[(&str, &str)] = &[
    (
        "drivers/tb6612fng",
        include_str!("../../parts/drivers/tb6612fng.yaml"),
    ),
    (
        "drivers/l298n",
        include_str!("../../parts/drivers/l298n.yaml"),
    ),
    (
        "drivers/drv8833",
        include_str!("../../parts/drivers/drv8833.yaml"),
    ),
    (
        "motors/n20_micro_6v",
        include_str!("../../parts/motors/n20_micro_6v.yaml"),
    ),
    (
        "motors/generic_dc_12v_gearmotor",
        include_str!("../../parts/motors/generic_dc_12v_gearmotor.yaml"),
    ),
    (
        "mcus/esp32s3",
        include_str!("../../parts/mcus/esp32s3.yaml"),
    ),
    (
        "mcus/rp2040",
        include_str!("../../parts/mcus/rp2040.yaml"),
    ),
    (
        "sensors/mpu6050",
        include_str!("../../parts/sensors/mpu6050.yaml"),
    ),
    (
        "sensors/bme280",
        include_str!("../../parts/sensors/bme280.yaml"),
    ),
    (
        "sensors/vl53l0x",
        include_str!("../../parts/sensors/vl53l0x.yaml"),
    ),
];

/// YAML source for an embedded part id, if present.
pub fn part_source(id: &str) -> Option<&'static str> {
    BUILTIN_PARTS
        .iter()
        .find(|(part_id, _)| *part_id == id)
        .map(|(_, text)| *text)
}
