//! In-process simulated sensors for CI/CD testing without a simulator.
//!
//! [`SimSensor`] implements [`Sensor`] for every sensor kind and produces
//! deterministic readings derived from its accumulated simulation time, so
//! the binding layer can be exercised end to end in headless tests.
//! [`SimRegistry`] builds a [`SensorRegistry`] pre-populated with one
//! `sim*` interface per kind.
//!
//! # Stub behaviour
//!
//! | Kind | Reading |
//! |---|---|
//! | Laser | One beam per `time_increment` across the horizontal angle range, ranges oscillating inside `[min_range, max_range]`. |
//! | Camera | RGB gradient over the frame; blue channel tracks time. |
//! | JointEncoder | `sin(t + i)` per joint, quantised to the joint resolution. |
//! | Force6D | Constant gravity load, small oscillating torque. |
//! | IMU | Constant yaw rate integrated into the orientation. |
//! | Odometry | Constant forward velocity integrated into the pose. |
//! | Tactile | One oscillating normal force per taxel. |
//! | Actuator | `Moving` while time advances, current around nominal. |
//!
//! # Example
//!
//! ```rust
//! use sensorbridge_hal::sim::SimRegistry;
//! use sensorbridge_types::{ConfigureCommand, SensorType};
//!
//! let registry = SimRegistry::new(1).with_all().build();
//! let mut laser = registry.create("simlaser").expect("registered");
//! laser.configure(ConfigureCommand::PowerOn, false);
//! assert!(laser.simulation_step(0.01));
//!
//! let mut data = laser.create_sensor_data(SensorType::Invalid).unwrap();
//! laser.read_sensor_data(&mut data).expect("powered sensor must read");
//! assert_eq!(data.stamp, 10_000);
//! ```

use std::f64::consts::FRAC_PI_2;

use sensorbridge_types::{
    ActuatorGeometry, ActuatorState, CameraGeometry, CameraIntrinsics, ConfigureCommand,
    Force6DGeometry, ImuGeometry, JointEncoderGeometry, LaserGeometry, OdometryGeometry,
    Quaternion, Reading, SensorData, SensorError, SensorGeometry, SensorType, TactileGeometry,
    Transform, Vec3,
};
use tracing::debug;

use crate::registry::SensorRegistry;
use crate::sensor::Sensor;

/// Beams produced when the laser geometry carries no usable scan timing.
const DEFAULT_BEAMS: usize = 16;
const MAX_BEAMS: usize = 4096;

const GRAVITY: f64 = 9.81;
const IMU_YAW_RATE: f64 = 0.1;
const ODOMETRY_SPEED: f64 = 0.5;
const DIAGONAL_VARIANCE: f64 = 1e-4;

/// Driver interface name under which [`SimRegistry`] publishes each kind.
pub fn sim_interface_name(sensor_type: SensorType) -> Option<&'static str> {
    let name = match sensor_type {
        SensorType::Invalid => return None,
        SensorType::Laser => "simlaser",
        SensorType::Camera => "simcamera",
        SensorType::JointEncoder => "simjointencoder",
        SensorType::Force6D => "simforce6d",
        SensorType::Imu => "simimu",
        SensorType::Odometry => "simodometry",
        SensorType::Tactile => "simtactile",
        SensorType::Actuator => "simactuator",
    };
    Some(name)
}

/// Geometry a freshly created simulated sensor of `sensor_type` starts with.
pub fn default_geometry(sensor_type: SensorType) -> Option<SensorGeometry> {
    let geometry = match sensor_type {
        SensorType::Invalid => return None,
        SensorType::Laser => SensorGeometry::Laser(LaserGeometry {
            min_angle: [-FRAC_PI_2, 0.0],
            max_angle: [FRAC_PI_2, 0.0],
            min_range: 0.05,
            max_range: 20.0,
            time_increment: 0.1 / 31.0,
            time_scan: 0.1,
        }),
        SensorType::Camera => SensorGeometry::Camera(CameraGeometry {
            hardware_id: "sim-cam-0".to_string(),
            width: 8,
            height: 6,
            intrinsics: CameraIntrinsics {
                fx: 5.0,
                fy: 5.0,
                cx: 4.0,
                cy: 3.0,
                distortion_model: String::new(),
                distortion_coeffs: Vec::new(),
                focal_length: 0.01,
            },
            ..CameraGeometry::default()
        }),
        SensorType::JointEncoder => SensorGeometry::JointEncoder(JointEncoderGeometry {
            resolution: vec![0.001; 3],
        }),
        SensorType::Force6D => SensorGeometry::Force6D(Force6DGeometry),
        SensorType::Imu => SensorGeometry::Imu(ImuGeometry {
            time_measurement: 0.01,
        }),
        SensorType::Odometry => SensorGeometry::Odometry(OdometryGeometry {
            target_id: "base_link".to_string(),
        }),
        SensorType::Tactile => SensorGeometry::Tactile(TactileGeometry {
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.01, 0.0, 0.0),
                Vec3::new(0.0, 0.01, 0.0),
                Vec3::new(0.01, 0.01, 0.0),
            ],
            thickness: 0.002,
        }),
        SensorType::Actuator => SensorGeometry::Actuator(ActuatorGeometry {
            max_torque: 10.0,
            max_current: 5.0,
            nominal_current: 2.0,
            max_velocity: 3.0,
            max_acceleration: 10.0,
            max_jerk: 100.0,
            static_friction: 0.1,
            viscous_friction: 0.01,
        }),
    };
    Some(geometry)
}

fn diagonal_covariance() -> [f64; 9] {
    let v = DIAGONAL_VARIANCE;
    [v, 0.0, 0.0, 0.0, v, 0.0, 0.0, 0.0, v]
}

// Range bounds in ascending order.  A single NaN bound collapses onto the
// other one.
fn ordered(a: f64, b: f64) -> (f64, f64) {
    (a.min(b), a.max(b))
}

// Overwrite `buf` without giving up its allocation.
fn refill<T: Copy>(buf: &mut Vec<T>, values: impl IntoIterator<Item = T>) {
    buf.clear();
    buf.extend(values);
}

// ────────────────────────────────────────────────────────────────────────────
// SimSensor
// ────────────────────────────────────────────────────────────────────────────

/// A simulated sensor of any kind.  Starts powered off.
pub struct SimSensor {
    xml_id: String,
    name: String,
    environment_id: u32,
    geometry: SensorGeometry,
    transform: Transform,
    powered: bool,
    render_data: bool,
    render_geometry: bool,
    sim_time: f64,
}

impl SimSensor {
    /// Create a simulated sensor with an explicit geometry.
    pub fn new(xml_id: impl Into<String>, geometry: SensorGeometry) -> Self {
        Self {
            xml_id: xml_id.into(),
            name: String::new(),
            environment_id: 0,
            geometry,
            transform: Transform::identity(),
            powered: false,
            render_data: false,
            render_geometry: false,
            sim_time: 0.0,
        }
    }

    /// Create a simulated sensor of `sensor_type` with its default geometry.
    ///
    /// `Invalid` falls back to a force/torque sensor, the kind with no
    /// configuration.
    pub fn of_type(sensor_type: SensorType) -> Self {
        let geometry = default_geometry(sensor_type)
            .unwrap_or(SensorGeometry::Force6D(Force6DGeometry));
        let xml_id = sim_interface_name(geometry.sensor_type()).unwrap_or("simforce6d");
        Self::new(xml_id, geometry)
    }

    pub fn with_environment(mut self, environment_id: u32) -> Self {
        self.environment_id = environment_id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Accumulated simulation time in seconds.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    fn native_type(&self) -> SensorType {
        self.geometry.sensor_type()
    }

    fn stamp(&self) -> u64 {
        (self.sim_time * 1e6).round() as u64
    }

    fn fill(&self, reading: &mut Reading) {
        let t = self.sim_time;
        match (reading, &self.geometry) {
            (Reading::Laser(r), SensorGeometry::Laser(g)) => {
                let beams = if g.time_increment > 0.0 && g.time_scan > 0.0 {
                    ((g.time_scan / g.time_increment).round() as usize + 1).min(MAX_BEAMS)
                } else {
                    DEFAULT_BEAMS
                };
                let span = g.max_angle[0] - g.min_angle[0];
                let step = if beams > 1 { span / (beams - 1) as f64 } else { 0.0 };
                let (lo, hi) = ordered(g.min_range, g.max_range);
                let mid = 0.5 * (lo + hi);
                let amplitude = 0.25 * (hi - lo);
                let origin = self.transform.trans;
                let ranges: Vec<(f64, f64)> = (0..beams)
                    .map(|i| {
                        let angle = g.min_angle[0] + step * i as f64;
                        let raw = mid + amplitude * (t + angle).sin();
                        // Both bounds NaN: nothing to clamp against.
                        let range = if lo <= hi { raw.clamp(lo, hi) } else { raw };
                        (angle, range)
                    })
                    .collect();
                refill(&mut r.positions, ranges.iter().map(|_| origin));
                refill(
                    &mut r.ranges,
                    ranges
                        .iter()
                        .map(|(a, d)| Vec3::new(a.cos() * d, a.sin() * d, 0.0)),
                );
                refill(&mut r.intensity, ranges.iter().map(|(_, d)| 1.0 / (1.0 + d)));
            }
            (Reading::Camera(r), SensorGeometry::Camera(g)) => {
                let (w, h) = (g.width as usize, g.height as usize);
                let blue = ((t * 10.0) as u64 % 256) as u8;
                r.image.clear();
                r.image.reserve(g.frame_len());
                for row in 0..h {
                    for col in 0..w {
                        r.image.push((col * 255 / w) as u8);
                        r.image.push((row * 255 / h) as u8);
                        r.image.push(blue);
                    }
                }
            }
            (Reading::JointEncoder(r), SensorGeometry::JointEncoder(g)) => {
                refill(
                    &mut r.encoder_values,
                    g.resolution.iter().enumerate().map(|(i, res)| {
                        let raw = (t + i as f64).sin();
                        if *res > 0.0 { (raw / res).round() * res } else { raw }
                    }),
                );
                refill(
                    &mut r.encoder_velocity,
                    (0..g.resolution.len()).map(|i| (t + i as f64).cos()),
                );
            }
            (Reading::Force6D(r), SensorGeometry::Force6D(_)) => {
                r.force = Vec3::new(0.0, 0.0, -GRAVITY);
                r.torque = Vec3::new(0.01 * t.sin(), 0.01 * t.cos(), 0.0);
            }
            (Reading::Imu(r), SensorGeometry::Imu(_)) => {
                r.rotation =
                    Quaternion::from_axis_angle(Vec3::new(0.0, 0.0, 1.0), IMU_YAW_RATE * t);
                r.angular_velocity = Vec3::new(0.0, 0.0, IMU_YAW_RATE);
                r.linear_acceleration = Vec3::new(0.0, 0.0, GRAVITY);
                refill(&mut r.rotation_covariance, diagonal_covariance());
                refill(&mut r.angular_velocity_covariance, diagonal_covariance());
                refill(&mut r.linear_acceleration_covariance, diagonal_covariance());
            }
            (Reading::Odometry(r), SensorGeometry::Odometry(_)) => {
                r.pose = Transform::new(
                    Quaternion::identity(),
                    Vec3::new(ODOMETRY_SPEED * t, 0.0, 0.0),
                );
                r.linear_velocity = Vec3::new(ODOMETRY_SPEED, 0.0, 0.0);
                r.angular_velocity = Vec3::zero();
                refill(&mut r.pose_covariance, diagonal_covariance());
                refill(&mut r.velocity_covariance, diagonal_covariance());
            }
            (Reading::Tactile(r), SensorGeometry::Tactile(g)) => {
                refill(
                    &mut r.forces,
                    (0..g.positions.len())
                        .map(|i| Vec3::new(0.0, 0.0, 0.5 + 0.1 * (t + i as f64).sin())),
                );
                refill(&mut r.force_covariance, diagonal_covariance());
            }
            (Reading::Actuator(r), SensorGeometry::Actuator(g)) => {
                r.state = if t > 0.0 {
                    ActuatorState::Moving
                } else {
                    ActuatorState::Idle
                };
                r.applied_current = g.nominal_current;
                r.measured_current = g.nominal_current * (1.0 + 0.05 * t.sin());
                r.measured_temperature = 25.0 + t.min(50.0);
            }
            // Kind checked by the caller.
            _ => {}
        }
    }
}

impl Sensor for SimSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn xml_id(&self) -> &str {
        &self.xml_id
    }

    fn environment_id(&self) -> u32 {
        self.environment_id
    }

    fn configure(&mut self, command: ConfigureCommand, blocking: bool) -> i32 {
        debug!(sensor = %self.name, ?command, blocking, "configure");
        let state = match command {
            ConfigureCommand::PowerOn => {
                self.powered = true;
                self.powered
            }
            ConfigureCommand::PowerOff => {
                self.powered = false;
                self.powered
            }
            ConfigureCommand::PowerCheck => self.powered,
            ConfigureCommand::RenderDataOn => {
                self.render_data = true;
                self.render_data
            }
            ConfigureCommand::RenderDataOff => {
                self.render_data = false;
                self.render_data
            }
            ConfigureCommand::RenderDataCheck => self.render_data,
            ConfigureCommand::RenderGeometryOn => {
                self.render_geometry = true;
                self.render_geometry
            }
            ConfigureCommand::RenderGeometryOff => {
                self.render_geometry = false;
                self.render_geometry
            }
            ConfigureCommand::RenderGeometryCheck => self.render_geometry,
        };
        i32::from(state)
    }

    fn simulation_step(&mut self, time_elapsed: f64) -> bool {
        if !self.powered || time_elapsed <= 0.0 {
            return false;
        }
        self.sim_time += time_elapsed;
        true
    }

    fn sensor_geometry(&self) -> Option<&SensorGeometry> {
        Some(&self.geometry)
    }

    fn set_sensor_geometry(&mut self, geometry: SensorGeometry) -> Result<(), SensorError> {
        if geometry.sensor_type() != self.native_type() {
            return Err(SensorError::TypeMismatch {
                expected: self.native_type(),
                actual: geometry.sensor_type(),
            });
        }
        self.geometry = geometry;
        Ok(())
    }

    fn create_sensor_data(&self, sensor_type: SensorType) -> Option<SensorData> {
        let requested = match sensor_type {
            SensorType::Invalid => self.native_type(),
            other => other,
        };
        if requested != self.native_type() {
            return None;
        }
        SensorData::empty(requested)
    }

    fn read_sensor_data(&self, data: &mut SensorData) -> Result<(), SensorError> {
        if data.sensor_type() != self.native_type() {
            return Err(SensorError::TypeMismatch {
                expected: self.native_type(),
                actual: data.sensor_type(),
            });
        }
        if !self.powered {
            return Err(SensorError::ReadFailed {
                sensor: self.name.clone(),
                reason: "sensor is powered off".to_string(),
            });
        }
        data.stamp = self.stamp();
        data.transform = self.transform;
        self.fill(&mut data.reading);
        Ok(())
    }

    fn supports(&self, sensor_type: SensorType) -> bool {
        sensor_type == self.native_type()
    }

    fn transform(&self) -> Transform {
        self.transform
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimRegistry builder
// ────────────────────────────────────────────────────────────────────────────

/// Builder that constructs a [`SensorRegistry`] populated with simulated
/// sensor interfaces.
#[derive(Default)]
pub struct SimRegistry {
    environment_id: u32,
    kinds: Vec<SensorType>,
}

impl SimRegistry {
    /// Create a builder for environment `environment_id` with no interfaces.
    pub fn new(environment_id: u32) -> Self {
        Self {
            environment_id,
            kinds: Vec::new(),
        }
    }

    /// Publish the `sim*` interface for `sensor_type`.  `Invalid` is ignored.
    pub fn with_sensor_type(mut self, sensor_type: SensorType) -> Self {
        if sensor_type != SensorType::Invalid && !self.kinds.contains(&sensor_type) {
            self.kinds.push(sensor_type);
        }
        self
    }

    /// Publish one `sim*` interface per concrete sensor kind.
    pub fn with_all(self) -> Self {
        SensorType::CONCRETE
            .into_iter()
            .fold(self, Self::with_sensor_type)
    }

    /// Consume the builder and return the populated [`SensorRegistry`].
    pub fn build(self) -> SensorRegistry {
        let mut registry = SensorRegistry::new(self.environment_id);
        for kind in self.kinds {
            if let Some(name) = sim_interface_name(kind) {
                registry.register_factory(name, move |env| {
                    Box::new(SimSensor::of_type(kind).with_environment(env))
                });
            }
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn powered(sensor_type: SensorType) -> SimSensor {
        let mut sensor = SimSensor::of_type(sensor_type).with_name("probe");
        sensor.configure(ConfigureCommand::PowerOn, false);
        sensor
    }

    fn read(sensor: &SimSensor) -> SensorData {
        let mut data = sensor.create_sensor_data(SensorType::Invalid).unwrap();
        sensor.read_sensor_data(&mut data).unwrap();
        data
    }

    #[test]
    fn every_kind_reads_its_own_tag() {
        for kind in SensorType::CONCRETE {
            let mut sensor = powered(kind);
            sensor.simulation_step(0.5);
            let data = read(&sensor);
            assert_eq!(data.sensor_type(), kind);
            assert_eq!(data.stamp, 500_000);
        }
    }

    #[test]
    fn configure_reports_power_state() {
        let mut sensor = SimSensor::of_type(SensorType::Laser);
        assert_eq!(sensor.configure(ConfigureCommand::PowerCheck, false), 0);
        assert_eq!(sensor.configure(ConfigureCommand::PowerOn, true), 1);
        assert_eq!(sensor.configure(ConfigureCommand::PowerCheck, false), 1);
        assert_eq!(sensor.configure(ConfigureCommand::RenderDataCheck, false), 0);
        assert_eq!(sensor.configure(ConfigureCommand::RenderGeometryOn, false), 1);
        assert_eq!(sensor.configure(ConfigureCommand::PowerOff, false), 0);
        assert!(!sensor.is_powered());
    }

    #[test]
    fn unpowered_sensor_does_not_step_or_read() {
        let mut sensor = SimSensor::of_type(SensorType::Imu);
        assert!(!sensor.simulation_step(0.1));
        assert_eq!(sensor.sim_time(), 0.0);

        let mut data = sensor.create_sensor_data(SensorType::Imu).unwrap();
        let err = sensor.read_sensor_data(&mut data).unwrap_err();
        assert!(matches!(err, SensorError::ReadFailed { .. }));
    }

    #[test]
    fn create_sensor_data_rejects_foreign_kind() {
        let sensor = SimSensor::of_type(SensorType::Camera);
        assert!(sensor.create_sensor_data(SensorType::Laser).is_none());
        assert!(sensor.create_sensor_data(SensorType::Camera).is_some());
    }

    #[test]
    fn read_rejects_buffer_of_foreign_kind() {
        let sensor = powered(SensorType::Camera);
        let mut data = SensorData::empty(SensorType::Laser).unwrap();
        let err = sensor.read_sensor_data(&mut data).unwrap_err();
        assert_eq!(
            err,
            SensorError::TypeMismatch {
                expected: SensorType::Camera,
                actual: SensorType::Laser
            }
        );
    }

    #[test]
    fn laser_beam_count_follows_scan_timing() {
        let sensor = powered(SensorType::Laser);
        let data = read(&sensor);
        match data.reading {
            Reading::Laser(r) => {
                assert_eq!(r.ranges.len(), 32);
                assert_eq!(r.positions.len(), 32);
                assert_eq!(r.intensity.len(), 32);
            }
            other => panic!("unexpected reading {other:?}"),
        }
    }

    #[test]
    fn camera_frame_matches_resolution() {
        let sensor = powered(SensorType::Camera);
        let data = read(&sensor);
        match data.reading {
            Reading::Camera(r) => assert_eq!(r.image.len(), 8 * 6 * 3),
            other => panic!("unexpected reading {other:?}"),
        }
    }

    #[test]
    fn odometry_pose_integrates_forward_speed() {
        let mut sensor = powered(SensorType::Odometry);
        sensor.simulation_step(2.0);
        match read(&sensor).reading {
            Reading::Odometry(r) => assert!((r.pose.trans.x - 1.0).abs() < 1e-12),
            other => panic!("unexpected reading {other:?}"),
        }
    }

    #[test]
    fn set_sensor_geometry_keeps_kind() {
        let mut sensor = SimSensor::of_type(SensorType::Imu);
        let err = sensor
            .set_sensor_geometry(SensorGeometry::Force6D(Force6DGeometry))
            .unwrap_err();
        assert!(matches!(err, SensorError::TypeMismatch { .. }));

        sensor
            .set_sensor_geometry(SensorGeometry::Imu(ImuGeometry {
                time_measurement: 0.5,
            }))
            .unwrap();
        assert_eq!(
            sensor.sensor_geometry(),
            Some(&SensorGeometry::Imu(ImuGeometry {
                time_measurement: 0.5
            }))
        );
    }

    fn laser_ranges(sensor: &SimSensor) -> Vec<f64> {
        match read(sensor).reading {
            Reading::Laser(r) => r.ranges.iter().map(|v| v.x.hypot(v.y)).collect(),
            other => panic!("expected laser reading, got {other:?}"),
        }
    }

    fn laser_with_ranges(min_range: f64, max_range: f64) -> SimSensor {
        let mut sensor = powered(SensorType::Laser);
        let Some(SensorGeometry::Laser(g)) = sensor.sensor_geometry().cloned() else {
            panic!("laser geometry");
        };
        sensor
            .set_sensor_geometry(SensorGeometry::Laser(LaserGeometry {
                min_range,
                max_range,
                ..g
            }))
            .unwrap();
        sensor.simulation_step(0.25);
        sensor
    }

    #[test]
    fn inverted_laser_ranges_still_read_within_bounds() {
        let sensor = laser_with_ranges(5.0, 1.0);
        let ranges = laser_ranges(&sensor);
        assert!(!ranges.is_empty());
        for d in ranges {
            assert!((1.0 - 1e-9..=5.0 + 1e-9).contains(&d), "range {d} escaped [1, 5]");
        }
    }

    #[test]
    fn nan_laser_ranges_do_not_abort_the_read() {
        let sensor = laser_with_ranges(f64::NAN, 4.0);
        assert!(laser_ranges(&sensor).iter().all(|d| (*d - 4.0).abs() < 1e-9));

        let sensor = laser_with_ranges(f64::NAN, f64::NAN);
        assert!(!laser_ranges(&sensor).is_empty());
    }

    #[test]
    fn sim_registry_publishes_every_kind() {
        let registry = SimRegistry::new(3).with_all().build();
        assert_eq!(registry.interfaces().len(), 8);
        for kind in SensorType::CONCRETE {
            let name = sim_interface_name(kind).unwrap();
            let sensor = registry.create(name).expect("registered");
            assert!(sensor.supports(kind));
            assert_eq!(sensor.xml_id(), name);
            assert_eq!(sensor.environment_id(), 3);
        }
    }

    #[test]
    fn sim_registry_ignores_invalid_and_duplicates() {
        let registry = SimRegistry::new(1)
            .with_sensor_type(SensorType::Invalid)
            .with_sensor_type(SensorType::Laser)
            .with_sensor_type(SensorType::Laser)
            .build();
        assert_eq!(registry.interfaces(), vec!["simlaser"]);
    }
}
