//! Native `Sensor` trait: the boundary the binding layer consumes.
//!
//! Drivers implement this trait and register a factory with a
//! [`SensorRegistry`][crate::registry::SensorRegistry].  The binding layer
//! only ever talks to the trait, so drivers can be swapped without touching
//! any host-facing code.

use sensorbridge_types::{
    ConfigureCommand, SensorData, SensorError, SensorGeometry, SensorType, Transform,
};

/// One physical or simulated sensor instance.
///
/// A sensor owns exactly one [`SensorGeometry`].  Data is read into caller
/// owned [`SensorData`] buffers obtained from
/// [`create_sensor_data`][Sensor::create_sensor_data], so a caller that keeps
/// its buffers can read repeatedly without reallocating.
pub trait Sensor: Send {
    /// Instance name, e.g. `"front_laser"`.
    fn name(&self) -> &str;

    fn set_name(&mut self, name: &str);

    /// Identifier of the driver interface that created this sensor.
    fn xml_id(&self) -> &str;

    /// Interface family label used in diagnostic strings.
    fn interface_type(&self) -> &str {
        "sensor"
    }

    /// Id of the environment that owns this sensor.
    fn environment_id(&self) -> u32;

    /// Apply a power or render-mode command and return the driver's status
    /// code.  `blocking` asks the driver to wait until the command has taken
    /// effect.
    fn configure(&mut self, command: ConfigureCommand, blocking: bool) -> i32;

    /// Advance internal state by `time_elapsed` seconds.  Returns `true` when
    /// the sensor state changed.
    fn simulation_step(&mut self, time_elapsed: f64) -> bool;

    /// Current static configuration, or `None` for a sensor that has not been
    /// given one yet.
    fn sensor_geometry(&self) -> Option<&SensorGeometry>;

    /// Replace the static configuration wholesale.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::TypeMismatch`] when the driver cannot take a
    /// geometry of that kind.
    fn set_sensor_geometry(&mut self, geometry: SensorGeometry) -> Result<(), SensorError>;

    /// Allocate an empty data buffer for `sensor_type`.
    ///
    /// [`SensorType::Invalid`] requests the sensor's native kind.  Returns
    /// `None` when the sensor cannot produce that kind.
    fn create_sensor_data(&self, sensor_type: SensorType) -> Option<SensorData>;

    /// Refill `data` with the latest sample.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::ReadFailed`] if no sample can be produced, or
    /// [`SensorError::TypeMismatch`] if `data` is of a kind this sensor does
    /// not produce.
    fn read_sensor_data(&self, data: &mut SensorData) -> Result<(), SensorError>;

    /// Whether the sensor can produce data of `sensor_type`.
    fn supports(&self, sensor_type: SensorType) -> bool;

    /// Pose of the sensor in the world frame.
    fn transform(&self) -> Transform;

    fn set_transform(&mut self, transform: Transform);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorbridge_types::{Force6DGeometry, Reading, Vec3};

    /// Minimal in-process force sensor used only for tests.
    struct MockForceSensor {
        name: String,
        geometry: SensorGeometry,
        transform: Transform,
    }

    impl MockForceSensor {
        fn new() -> Self {
            Self {
                name: "wrist_ft".to_string(),
                geometry: SensorGeometry::Force6D(Force6DGeometry),
                transform: Transform::identity(),
            }
        }
    }

    impl Sensor for MockForceSensor {
        fn name(&self) -> &str {
            &self.name
        }
        fn set_name(&mut self, name: &str) {
            self.name = name.to_string();
        }
        fn xml_id(&self) -> &str {
            "mockforce"
        }
        fn environment_id(&self) -> u32 {
            1
        }
        fn configure(&mut self, _command: ConfigureCommand, _blocking: bool) -> i32 {
            0
        }
        fn simulation_step(&mut self, _time_elapsed: f64) -> bool {
            false
        }
        fn sensor_geometry(&self) -> Option<&SensorGeometry> {
            Some(&self.geometry)
        }
        fn set_sensor_geometry(&mut self, geometry: SensorGeometry) -> Result<(), SensorError> {
            self.geometry = geometry;
            Ok(())
        }
        fn create_sensor_data(&self, sensor_type: SensorType) -> Option<SensorData> {
            match sensor_type {
                SensorType::Invalid | SensorType::Force6D => SensorData::empty(SensorType::Force6D),
                _ => None,
            }
        }
        fn read_sensor_data(&self, data: &mut SensorData) -> Result<(), SensorError> {
            match &mut data.reading {
                Reading::Force6D(r) => {
                    r.force = Vec3::new(0.0, 0.0, -9.81);
                    Ok(())
                }
                other => Err(SensorError::TypeMismatch {
                    expected: SensorType::Force6D,
                    actual: other.sensor_type(),
                }),
            }
        }
        fn supports(&self, sensor_type: SensorType) -> bool {
            sensor_type == SensorType::Force6D
        }
        fn transform(&self) -> Transform {
            self.transform
        }
        fn set_transform(&mut self, transform: Transform) {
            self.transform = transform;
        }
    }

    #[test]
    fn invalid_request_yields_native_kind() {
        let sensor = MockForceSensor::new();
        let data = sensor.create_sensor_data(SensorType::Invalid).unwrap();
        assert_eq!(data.sensor_type(), SensorType::Force6D);
        assert!(sensor.create_sensor_data(SensorType::Laser).is_none());
    }

    #[test]
    fn read_fills_buffer_in_place() {
        let sensor = MockForceSensor::new();
        let mut data = sensor.create_sensor_data(SensorType::Force6D).unwrap();
        sensor.read_sensor_data(&mut data).unwrap();
        match data.reading {
            Reading::Force6D(r) => assert_eq!(r.force.z, -9.81),
            other => panic!("unexpected reading {other:?}"),
        }
    }

    #[test]
    fn interface_type_defaults_to_sensor() {
        let mut sensor = MockForceSensor::new();
        assert_eq!(sensor.interface_type(), "sensor");
        sensor.set_name("renamed");
        assert_eq!(sensor.name(), "renamed");
    }
}
