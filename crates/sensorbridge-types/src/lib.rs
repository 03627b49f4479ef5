//! `sensorbridge-types` – shared sensor vocabulary.
//!
//! Every other crate in the workspace speaks in terms of the types defined
//! here: the [`SensorType`] tag, the [`ConfigureCommand`] set, the global
//! [`SensorError`], the rigid-body primitives in [`math`] and the native
//! geometry/data records in [`native`].

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod math;
pub mod native;

pub use math::{Matrix3, Matrix4, Pose, Quaternion, Transform, Vec3};
pub use native::{
    ActuatorGeometry, ActuatorReading, CameraGeometry, CameraIntrinsics, CameraReading,
    Force6DGeometry, Force6DReading, ImuGeometry, ImuReading, JointEncoderGeometry,
    JointEncoderReading, LaserGeometry, LaserReading, OdometryGeometry, OdometryReading, Reading,
    SensorData, SensorGeometry, TactileGeometry, TactileReading,
};

/// Tag identifying the kind of a sensor, its geometry and its data.
///
/// `Invalid` never labels a real geometry or reading.  When passed as a
/// request it means "whatever the sensor natively produces".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[repr(i32)]
pub enum SensorType {
    Invalid = 0,
    Laser = 1,
    Camera = 2,
    JointEncoder = 3,
    Force6D = 4,
    #[serde(rename = "IMU")]
    Imu = 5,
    Odometry = 6,
    Tactile = 7,
    Actuator = 8,
}

impl SensorType {
    /// Every concrete (non-`Invalid`) sensor type, in tag order.
    pub const CONCRETE: [SensorType; 8] = [
        SensorType::Laser,
        SensorType::Camera,
        SensorType::JointEncoder,
        SensorType::Force6D,
        SensorType::Imu,
        SensorType::Odometry,
        SensorType::Tactile,
        SensorType::Actuator,
    ];

    /// Every tag including `Invalid`, in tag order.
    pub const ALL: [SensorType; 9] = [
        SensorType::Invalid,
        SensorType::Laser,
        SensorType::Camera,
        SensorType::JointEncoder,
        SensorType::Force6D,
        SensorType::Imu,
        SensorType::Odometry,
        SensorType::Tactile,
        SensorType::Actuator,
    ];

    /// Raw integer tag.
    pub fn as_raw(self) -> i32 {
        self as i32
    }

    /// Name under which the tag is published to the scripting host.
    pub fn host_name(self) -> &'static str {
        match self {
            SensorType::Invalid => "Invalid",
            SensorType::Laser => "Laser",
            SensorType::Camera => "Camera",
            SensorType::JointEncoder => "JointEncoder",
            SensorType::Force6D => "Force6D",
            SensorType::Imu => "IMU",
            SensorType::Odometry => "Odometry",
            SensorType::Tactile => "Tactile",
            SensorType::Actuator => "Actuator",
        }
    }

    /// Resolve a host-side name (`"Laser"`, `"IMU"`, …).
    pub fn from_host_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.host_name() == name)
    }
}

impl TryFrom<i32> for SensorType {
    type Error = SensorError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_raw() == raw)
            .ok_or(SensorError::UnsupportedType(raw))
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_name())
    }
}

/// Power and render-mode commands accepted by a sensor's `configure`.
///
/// The `*Check` commands query the current state without changing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[repr(i32)]
pub enum ConfigureCommand {
    PowerOn = 0x10,
    PowerOff = 0x11,
    PowerCheck = 0x12,
    RenderDataOn = 0x20,
    RenderDataOff = 0x21,
    RenderDataCheck = 0x23,
    RenderGeometryOn = 0x30,
    RenderGeometryOff = 0x31,
    RenderGeometryCheck = 0x32,
}

impl ConfigureCommand {
    pub const ALL: [ConfigureCommand; 9] = [
        ConfigureCommand::PowerOn,
        ConfigureCommand::PowerOff,
        ConfigureCommand::PowerCheck,
        ConfigureCommand::RenderDataOn,
        ConfigureCommand::RenderDataOff,
        ConfigureCommand::RenderDataCheck,
        ConfigureCommand::RenderGeometryOn,
        ConfigureCommand::RenderGeometryOff,
        ConfigureCommand::RenderGeometryCheck,
    ];

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    pub fn host_name(self) -> &'static str {
        match self {
            ConfigureCommand::PowerOn => "PowerOn",
            ConfigureCommand::PowerOff => "PowerOff",
            ConfigureCommand::PowerCheck => "PowerCheck",
            ConfigureCommand::RenderDataOn => "RenderDataOn",
            ConfigureCommand::RenderDataOff => "RenderDataOff",
            ConfigureCommand::RenderDataCheck => "RenderDataCheck",
            ConfigureCommand::RenderGeometryOn => "RenderGeometryOn",
            ConfigureCommand::RenderGeometryOff => "RenderGeometryOff",
            ConfigureCommand::RenderGeometryCheck => "RenderGeometryCheck",
        }
    }

    pub fn from_host_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.host_name() == name)
    }
}

impl TryFrom<i32> for ConfigureCommand {
    type Error = SensorError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_raw() == raw)
            .ok_or(SensorError::UnsupportedCommand(raw))
    }
}

/// Operating state reported by an actuator reading.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[repr(i32)]
pub enum ActuatorState {
    #[default]
    Undefined = 0,
    Idle = 1,
    Moving = 2,
    Stalled = 3,
    Braked = 4,
}

impl ActuatorState {
    pub const ALL: [ActuatorState; 5] = [
        ActuatorState::Undefined,
        ActuatorState::Idle,
        ActuatorState::Moving,
        ActuatorState::Stalled,
        ActuatorState::Braked,
    ];

    pub fn as_raw(self) -> i32 {
        self as i32
    }

    pub fn host_name(self) -> &'static str {
        match self {
            ActuatorState::Undefined => "Undefined",
            ActuatorState::Idle => "Idle",
            ActuatorState::Moving => "Moving",
            ActuatorState::Stalled => "Stalled",
            ActuatorState::Braked => "Braked",
        }
    }
}

/// Global error type for sensor marshaling and native sensor access.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SensorError {
    #[error("unknown sensor data type {0}")]
    UnsupportedType(i32),

    #[error("unknown configure command {0:#x}")]
    UnsupportedCommand(i32),

    #[error("sensor data read failed on '{sensor}': {reason}")]
    ReadFailed { sensor: String, reason: String },

    #[error("sensor type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: SensorType,
        actual: SensorType,
    },

    #[error("array shape mismatch: expected {expected} values, got {actual}")]
    Shape { expected: usize, actual: usize },

    #[error("bad image data: expected {expected} bytes, got {actual}")]
    BadImageData { expected: usize, actual: usize },

    #[error("sensor '{0}' has no geometry")]
    NoGeometry(String),
}
