//! Native sensor records.
//!
//! These are the structures a native sensor hands across the boundary: one
//! static [`SensorGeometry`] describing the sensor, and [`SensorData`]
//! buffers that the sensor refills on every read.  Both are closed sum types
//! over the eight sensor kinds, so the tag can never disagree with the
//! payload.
//!
//! Covariance buffers are flat (9 values, row-major) as native drivers
//! publish them; the host-facing proxies reshape them.

use serde::{Deserialize, Serialize};

use crate::math::{Quaternion, Transform, Vec3};
use crate::{ActuatorState, SensorType};

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// Pinhole intrinsics of a camera.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    /// e.g. `"opencv"` or `"kannala-brandt"`; empty when undistorted.
    pub distortion_model: String,
    pub distortion_coeffs: Vec<f64>,
    pub focal_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraGeometry {
    pub hardware_id: String,
    pub width: u32,
    pub height: u32,
    pub intrinsics: CameraIntrinsics,
    pub sensor_reference: String,
    pub target_region: String,
    pub measurement_time: f64,
    pub gain: f64,
}

impl Default for CameraGeometry {
    fn default() -> Self {
        Self {
            hardware_id: String::new(),
            width: 0,
            height: 0,
            intrinsics: CameraIntrinsics::default(),
            sensor_reference: String::new(),
            target_region: String::new(),
            measurement_time: 1.0,
            gain: 1.0,
        }
    }
}

impl CameraGeometry {
    /// Byte length of one RGB frame at this resolution.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// Scan limits of a planar or 3-D laser.  Angles are `[horizontal, vertical]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LaserGeometry {
    pub min_angle: [f64; 2],
    pub max_angle: [f64; 2],
    pub min_range: f64,
    pub max_range: f64,
    pub time_increment: f64,
    pub time_scan: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointEncoderGeometry {
    /// Encoder resolution per joint.
    pub resolution: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Force6DGeometry;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImuGeometry {
    pub time_measurement: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OdometryGeometry {
    /// Name of the body whose motion is measured.
    pub target_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TactileGeometry {
    /// Taxel positions in the sensor frame.
    pub positions: Vec<Vec3>,
    pub thickness: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActuatorGeometry {
    pub max_torque: f64,
    pub max_current: f64,
    pub nominal_current: f64,
    pub max_velocity: f64,
    pub max_acceleration: f64,
    pub max_jerk: f64,
    pub static_friction: f64,
    pub viscous_friction: f64,
}

/// Static configuration of one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SensorGeometry {
    Laser(LaserGeometry),
    Camera(CameraGeometry),
    JointEncoder(JointEncoderGeometry),
    Force6D(Force6DGeometry),
    Imu(ImuGeometry),
    Odometry(OdometryGeometry),
    Tactile(TactileGeometry),
    Actuator(ActuatorGeometry),
}

impl SensorGeometry {
    pub fn sensor_type(&self) -> SensorType {
        match self {
            SensorGeometry::Laser(_) => SensorType::Laser,
            SensorGeometry::Camera(_) => SensorType::Camera,
            SensorGeometry::JointEncoder(_) => SensorType::JointEncoder,
            SensorGeometry::Force6D(_) => SensorType::Force6D,
            SensorGeometry::Imu(_) => SensorType::Imu,
            SensorGeometry::Odometry(_) => SensorType::Odometry,
            SensorGeometry::Tactile(_) => SensorType::Tactile,
            SensorGeometry::Actuator(_) => SensorType::Actuator,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Data
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LaserReading {
    /// Sensor origin of every beam.
    pub positions: Vec<Vec3>,
    /// Beam direction scaled by the measured range.
    pub ranges: Vec<Vec3>,
    pub intensity: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraReading {
    /// Packed RGB24, row-major, `height * width * 3` bytes.
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointEncoderReading {
    pub encoder_values: Vec<f64>,
    pub encoder_velocity: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Force6DReading {
    pub force: Vec3,
    pub torque: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImuReading {
    pub rotation: Quaternion,
    pub angular_velocity: Vec3,
    pub linear_acceleration: Vec3,
    pub rotation_covariance: Vec<f64>,
    pub angular_velocity_covariance: Vec<f64>,
    pub linear_acceleration_covariance: Vec<f64>,
}

impl Default for ImuReading {
    fn default() -> Self {
        Self {
            rotation: Quaternion::identity(),
            angular_velocity: Vec3::zero(),
            linear_acceleration: Vec3::zero(),
            rotation_covariance: vec![0.0; 9],
            angular_velocity_covariance: vec![0.0; 9],
            linear_acceleration_covariance: vec![0.0; 9],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdometryReading {
    pub pose: Transform,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub pose_covariance: Vec<f64>,
    pub velocity_covariance: Vec<f64>,
}

impl Default for OdometryReading {
    fn default() -> Self {
        Self {
            pose: Transform::identity(),
            linear_velocity: Vec3::zero(),
            angular_velocity: Vec3::zero(),
            pose_covariance: vec![0.0; 9],
            velocity_covariance: vec![0.0; 9],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TactileReading {
    /// Force measured at each taxel.
    pub forces: Vec<Vec3>,
    pub force_covariance: Vec<f64>,
}

impl Default for TactileReading {
    fn default() -> Self {
        Self {
            forces: Vec::new(),
            force_covariance: vec![0.0; 9],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActuatorReading {
    pub state: ActuatorState,
    pub measured_current: f64,
    pub measured_temperature: f64,
    pub applied_current: f64,
}

/// Per-kind payload of a [`SensorData`] buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reading {
    Laser(LaserReading),
    Camera(CameraReading),
    JointEncoder(JointEncoderReading),
    Force6D(Force6DReading),
    Imu(ImuReading),
    Odometry(OdometryReading),
    Tactile(TactileReading),
    Actuator(ActuatorReading),
}

impl Reading {
    /// A zeroed payload of the given kind, or `None` for `Invalid`.
    pub fn empty(sensor_type: SensorType) -> Option<Self> {
        let reading = match sensor_type {
            SensorType::Invalid => return None,
            SensorType::Laser => Reading::Laser(LaserReading::default()),
            SensorType::Camera => Reading::Camera(CameraReading::default()),
            SensorType::JointEncoder => Reading::JointEncoder(JointEncoderReading::default()),
            SensorType::Force6D => Reading::Force6D(Force6DReading::default()),
            SensorType::Imu => Reading::Imu(ImuReading::default()),
            SensorType::Odometry => Reading::Odometry(OdometryReading::default()),
            SensorType::Tactile => Reading::Tactile(TactileReading::default()),
            SensorType::Actuator => Reading::Actuator(ActuatorReading::default()),
        };
        Some(reading)
    }

    pub fn sensor_type(&self) -> SensorType {
        match self {
            Reading::Laser(_) => SensorType::Laser,
            Reading::Camera(_) => SensorType::Camera,
            Reading::JointEncoder(_) => SensorType::JointEncoder,
            Reading::Force6D(_) => SensorType::Force6D,
            Reading::Imu(_) => SensorType::Imu,
            Reading::Odometry(_) => SensorType::Odometry,
            Reading::Tactile(_) => SensorType::Tactile,
            Reading::Actuator(_) => SensorType::Actuator,
        }
    }
}

/// One timestamped sample, refilled in place by the owning sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    /// Simulation time of the sample in microseconds.
    pub stamp: u64,
    /// Sensor pose at the time of the sample.
    pub transform: Transform,
    pub reading: Reading,
}

impl SensorData {
    /// An unfilled buffer of the given kind, or `None` for `Invalid`.
    pub fn empty(sensor_type: SensorType) -> Option<Self> {
        Reading::empty(sensor_type).map(|reading| Self {
            stamp: 0,
            transform: Transform::identity(),
            reading,
        })
    }

    pub fn sensor_type(&self) -> SensorType {
        self.reading.sensor_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_carries_requested_tag() {
        for t in SensorType::CONCRETE {
            let data = SensorData::empty(t).expect("concrete tag");
            assert_eq!(data.sensor_type(), t);
            assert_eq!(data.stamp, 0);
        }
    }

    #[test]
    fn empty_buffer_rejects_invalid() {
        assert!(SensorData::empty(SensorType::Invalid).is_none());
    }

    #[test]
    fn default_covariances_are_3x3_sized() {
        let imu = ImuReading::default();
        assert_eq!(imu.rotation_covariance.len(), 9);
        assert_eq!(OdometryReading::default().velocity_covariance.len(), 9);
        assert_eq!(TactileReading::default().force_covariance.len(), 9);
    }

    #[test]
    fn camera_geometry_defaults_unit_timing_and_gain() {
        let g = CameraGeometry::default();
        assert_eq!(g.measurement_time, 1.0);
        assert_eq!(g.gain, 1.0);
        assert_eq!(g.frame_len(), 0);
    }

    #[test]
    fn geometry_serialization_roundtrip() {
        let geom = SensorGeometry::Laser(LaserGeometry {
            min_angle: [-1.5, 0.0],
            max_angle: [1.5, 0.0],
            min_range: 0.1,
            max_range: 30.0,
            time_increment: 1e-4,
            time_scan: 0.1,
        });
        let json = serde_json::to_string(&geom).unwrap();
        let back: SensorGeometry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, geom);
        assert_eq!(back.sensor_type(), SensorType::Laser);
    }
}
