//! [`SensorHandle`] – host-facing adapter around one native sensor.
//!
//! The adapter owns the native sensor and a per-type cache of native data
//! buffers.  The first `sensor_data(t)` call for a type asks the sensor for a
//! fresh buffer; later calls refill that same buffer in place, so a script
//! polling a sensor in a loop does not allocate a new native sample per
//! call.  The returned proxies are always fresh snapshots.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use sensorbridge_hal::Sensor;
use sensorbridge_types::{
    ConfigureCommand, Matrix4, Pose, SensorData, SensorError, SensorGeometry, SensorType,
};
use tracing::{debug, instrument, warn};

use crate::convert::TransformArg;
use crate::data::SensorDataProxy;
use crate::geometry::GeometryProxy;

pub struct SensorHandle {
    sensor: Box<dyn Sensor>,
    cache: HashMap<SensorType, SensorData>,
}

impl SensorHandle {
    pub fn new(sensor: Box<dyn Sensor>) -> Self {
        Self {
            sensor,
            cache: HashMap::new(),
        }
    }

    /// The wrapped native sensor.
    pub fn sensor(&self) -> &dyn Sensor {
        self.sensor.as_ref()
    }

    #[instrument(skip(self), fields(sensor = %self.sensor.name()))]
    pub fn configure(&mut self, command: ConfigureCommand, blocking: bool) -> i32 {
        self.sensor.configure(command, blocking)
    }

    pub fn simulation_step(&mut self, time_elapsed: f64) -> bool {
        self.sensor.simulation_step(time_elapsed)
    }

    fn geometry(&self) -> Result<&SensorGeometry, SensorError> {
        self.sensor
            .sensor_geometry()
            .ok_or_else(|| SensorError::NoGeometry(self.sensor.name().to_string()))
    }

    /// Snapshot of the sensor geometry.
    ///
    /// `Invalid` stands for the native geometry's own type.
    ///
    /// # Errors
    ///
    /// [`SensorError::UnsupportedType`] when `sensor_type` is not the kind of
    /// the native geometry, or when the sensor has no geometry.
    #[instrument(skip(self), fields(sensor = %self.sensor.name()))]
    pub fn sensor_geometry(&self, sensor_type: SensorType) -> Result<GeometryProxy, SensorError> {
        let geometry = self
            .sensor
            .sensor_geometry()
            .ok_or(SensorError::UnsupportedType(sensor_type.as_raw()))?;
        if sensor_type != SensorType::Invalid && sensor_type != geometry.sensor_type() {
            return Err(SensorError::UnsupportedType(sensor_type.as_raw()));
        }
        Ok(GeometryProxy::from_native(geometry))
    }

    /// Replace the native geometry wholesale.
    #[instrument(skip(self, geometry), fields(sensor = %self.sensor.name(), kind = %geometry.sensor_type()))]
    pub fn set_sensor_geometry(&mut self, geometry: &GeometryProxy) -> Result<(), SensorError> {
        self.sensor.set_sensor_geometry(geometry.to_native())?;
        // Buffers sized for the old geometry may no longer convert.
        self.cache.clear();
        Ok(())
    }

    /// A fresh, unread data snapshot of `sensor_type`: zero stamp, no
    /// transform, geometry-derived fields filled in.
    ///
    /// # Errors
    ///
    /// - [`SensorError::UnsupportedType`] when the sensor cannot produce that
    ///   type.
    /// - [`SensorError::TypeMismatch`] when the sensor hands back a buffer of
    ///   another kind than its geometry.
    #[instrument(skip(self), fields(sensor = %self.sensor.name()))]
    pub fn create_sensor_data(
        &self,
        sensor_type: SensorType,
    ) -> Result<SensorDataProxy, SensorError> {
        let data = self
            .sensor
            .create_sensor_data(sensor_type)
            .ok_or(SensorError::UnsupportedType(sensor_type.as_raw()))?;
        let geometry = self.geometry()?;
        if data.sensor_type() != geometry.sensor_type() {
            return Err(SensorError::TypeMismatch {
                expected: geometry.sensor_type(),
                actual: data.sensor_type(),
            });
        }
        Ok(SensorDataProxy::empty(geometry))
    }

    /// Read the latest sample of `sensor_type` through the per-type cache.
    ///
    /// # Errors
    ///
    /// - [`SensorError::UnsupportedType`] when the sensor cannot produce that
    ///   type.
    /// - [`SensorError::ReadFailed`] when the native read fails.
    #[instrument(skip(self), fields(sensor = %self.sensor.name()))]
    pub fn sensor_data(&mut self, sensor_type: SensorType) -> Result<SensorDataProxy, SensorError> {
        let buffer = match self.cache.entry(sensor_type) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => {
                let data = self
                    .sensor
                    .create_sensor_data(sensor_type)
                    .ok_or(SensorError::UnsupportedType(sensor_type.as_raw()))?;
                debug!(requested = %sensor_type, native = %data.sensor_type(), "cached new data buffer");
                v.insert(data)
            }
        };
        if let Err(e) = self.sensor.read_sensor_data(buffer) {
            warn!(error = %e, "sensor data read failed");
            return Err(match e {
                SensorError::ReadFailed { .. } => e,
                other => SensorError::ReadFailed {
                    sensor: self.sensor.name().to_string(),
                    reason: other.to_string(),
                },
            });
        }
        let geometry = self
            .sensor
            .sensor_geometry()
            .ok_or_else(|| SensorError::NoGeometry(self.sensor.name().to_string()))?;
        SensorDataProxy::from_native(geometry, buffer)
    }

    /// `sensor_data` for the sensor's native type.
    pub fn sensor_data_default(&mut self) -> Result<SensorDataProxy, SensorError> {
        self.sensor_data(SensorType::Invalid)
    }

    /// Types with a cached native buffer.
    pub fn cached_types(&self) -> Vec<SensorType> {
        let mut types: Vec<SensorType> = self.cache.keys().copied().collect();
        types.sort_unstable();
        types
    }

    pub fn transform(&self) -> Matrix4 {
        self.sensor.transform().to_matrix()
    }

    /// `[qw, qx, qy, qz, x, y, z]`
    pub fn transform_pose(&self) -> Pose {
        self.sensor.transform().to_pose()
    }

    pub fn set_transform(&mut self, transform: TransformArg) {
        self.sensor.set_transform(transform.into());
    }

    pub fn name(&self) -> &str {
        self.sensor.name()
    }

    pub fn set_name(&mut self, name: &str) {
        self.sensor.set_name(name);
    }

    pub fn supports(&self, sensor_type: SensorType) -> bool {
        self.sensor.supports(sensor_type)
    }

    /// Host `repr()`: an expression that retrieves this sensor again.
    pub fn repr(&self) -> String {
        format!(
            "<Environment({}).GetSensor('{}')>",
            self.sensor.environment_id(),
            self.sensor.name()
        )
    }
}

impl fmt::Display for SensorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}:{} - {}>",
            self.sensor.interface_type(),
            self.sensor.xml_id(),
            self.sensor.name()
        )
    }
}

impl fmt::Debug for SensorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorHandle")
            .field("sensor", &self.to_string())
            .field("cached", &self.cached_types())
            .finish()
    }
}
