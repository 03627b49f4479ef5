//! Sensor data proxies: host-side snapshots of one [`SensorData`] sample.
//!
//! A data proxy is always built against the geometry of the sensor that
//! produced it.  Geometry-derived fields (joint resolution, odometry target,
//! taxel positions, actuator limits, camera calibration) are copied onto the
//! snapshot so the host never needs a second call to interpret a reading.
//! All attributes are read-only.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sensorbridge_types::math::matrix3_from_slice;
use sensorbridge_types::{
    ActuatorGeometry, ActuatorState, CameraGeometry, Matrix3, Matrix4, Pose, Reading,
    SensorData, SensorError, SensorGeometry, SensorType, Vec3,
};

use crate::intrinsics::{CameraIntrinsicsProxy, calibration_matrix};
use crate::host_float;
use crate::namespace::{AttrSpec, HostObject};

// ────────────────────────────────────────────────────────────────────────────
// Payloads
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct LaserDataProxy {
    /// Beam origins, N×3.
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub positions: Vec<[f64; 3]>,
    /// Beam vectors scaled by range, N×3.
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub ranges: Vec<[f64; 3]>,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub intensity: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct CameraDataProxy {
    /// height × width × RGB
    pub imagedata: Vec<Vec<[u8; 3]>>,
    #[serde(rename = "KK")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub kk: Matrix3,
    pub intrinsics: CameraIntrinsicsProxy,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct JointEncoderDataProxy {
    #[serde(rename = "encoderValues")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub encoder_values: Vec<f64>,
    #[serde(rename = "encoderVelocity")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub encoder_velocity: Vec<f64>,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub resolution: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Force6DDataProxy {
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub force: [f64; 3],
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub torque: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ImuDataProxy {
    /// `[w, x, y, z]`
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub rotation: [f64; 4],
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub angular_velocity: [f64; 3],
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub linear_acceleration: [f64; 3],
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub rotation_covariance: Matrix3,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub angular_velocity_covariance: Matrix3,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub linear_acceleration_covariance: Matrix3,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct OdometryDataProxy {
    /// `[qw, qx, qy, qz, x, y, z]`
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub pose: Pose,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub linear_velocity: [f64; 3],
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub angular_velocity: [f64; 3],
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub pose_covariance: Matrix3,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub velocity_covariance: Matrix3,
    pub targetid: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TactileDataProxy {
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub forces: Vec<[f64; 3]>,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub force_covariance: Matrix3,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub positions: Vec<[f64; 3]>,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub thickness: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ActuatorDataProxy {
    pub state: ActuatorState,
    #[serde(rename = "measuredcurrent")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub measured_current: f64,
    #[serde(rename = "measuredtemperature")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub measured_temperature: f64,
    #[serde(rename = "appliedcurrent")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub applied_current: f64,
    #[serde(rename = "maxtorque")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub max_torque: f64,
    #[serde(rename = "maxcurrent")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub max_current: f64,
    #[serde(rename = "nominalcurrent")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub nominal_current: f64,
    #[serde(rename = "maxvelocity")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub max_velocity: f64,
    #[serde(rename = "maxacceleration")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub max_acceleration: f64,
    #[serde(rename = "maxjerk")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub max_jerk: f64,
    #[serde(rename = "staticfriction")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub static_friction: f64,
    #[serde(rename = "viscousfriction")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub viscous_friction: f64,
}

impl ActuatorDataProxy {
    fn with_limits(g: &ActuatorGeometry) -> Self {
        Self {
            max_torque: g.max_torque,
            max_current: g.max_current,
            nominal_current: g.nominal_current,
            max_velocity: g.max_velocity,
            max_acceleration: g.max_acceleration,
            max_jerk: g.max_jerk,
            static_friction: g.static_friction,
            viscous_friction: g.viscous_friction,
            ..Self::default()
        }
    }
}

/// Per-kind payload.  The host value carries the kind in a `"type"` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum DataPayload {
    Laser(LaserDataProxy),
    Camera(CameraDataProxy),
    JointEncoder(JointEncoderDataProxy),
    Force6D(Force6DDataProxy),
    #[serde(rename = "IMU")]
    Imu(ImuDataProxy),
    Odometry(OdometryDataProxy),
    Tactile(TactileDataProxy),
    Actuator(ActuatorDataProxy),
}

impl DataPayload {
    pub fn sensor_type(&self) -> SensorType {
        match self {
            DataPayload::Laser(_) => SensorType::Laser,
            DataPayload::Camera(_) => SensorType::Camera,
            DataPayload::JointEncoder(_) => SensorType::JointEncoder,
            DataPayload::Force6D(_) => SensorType::Force6D,
            DataPayload::Imu(_) => SensorType::Imu,
            DataPayload::Odometry(_) => SensorType::Odometry,
            DataPayload::Tactile(_) => SensorType::Tactile,
            DataPayload::Actuator(_) => SensorType::Actuator,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SensorDataProxy
// ────────────────────────────────────────────────────────────────────────────

/// Host view of one sample: common header plus per-kind payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SensorDataProxy {
    /// Sample time in microseconds.
    pub stamp: u64,
    /// Sensor pose at sample time.  `None` on a snapshot that was never
    /// filled by the sensor.
    #[serde(default)]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub transform: Option<Matrix4>,
    #[serde(flatten)]
    pub payload: DataPayload,
}

fn points(v: &[Vec3]) -> Vec<[f64; 3]> {
    v.iter().map(|p| p.to_array()).collect()
}

fn image_rows(bytes: &[u8], width: usize) -> Vec<Vec<[u8; 3]>> {
    if width == 0 {
        return Vec::new();
    }
    bytes
        .chunks_exact(width * 3)
        .map(|row| row.chunks_exact(3).map(|px| [px[0], px[1], px[2]]).collect())
        .collect()
}

fn camera_payload(g: &CameraGeometry, image: &[u8]) -> Result<CameraDataProxy, SensorError> {
    if image.len() != g.frame_len() {
        return Err(SensorError::BadImageData {
            expected: g.frame_len(),
            actual: image.len(),
        });
    }
    let i = &g.intrinsics;
    Ok(CameraDataProxy {
        imagedata: image_rows(image, g.width as usize),
        kk: calibration_matrix(i.fx, i.fy, i.cx, i.cy),
        intrinsics: CameraIntrinsicsProxy::from_native(i),
    })
}

impl SensorDataProxy {
    pub fn sensor_type(&self) -> SensorType {
        self.payload.sensor_type()
    }

    /// Convert a native sample taken by a sensor with geometry `geometry`.
    ///
    /// # Errors
    ///
    /// - [`SensorError::TypeMismatch`] when `data` is not of the geometry's
    ///   kind.
    /// - [`SensorError::Shape`] when a covariance buffer does not hold
    ///   exactly nine values.
    /// - [`SensorError::BadImageData`] when a camera frame does not hold
    ///   exactly `height * width * 3` bytes.
    pub fn from_native(geometry: &SensorGeometry, data: &SensorData) -> Result<Self, SensorError> {
        let payload = match (geometry, &data.reading) {
            (SensorGeometry::Laser(_), Reading::Laser(r)) => DataPayload::Laser(LaserDataProxy {
                positions: points(&r.positions),
                ranges: points(&r.ranges),
                intensity: r.intensity.clone(),
            }),
            (SensorGeometry::Camera(g), Reading::Camera(r)) => {
                DataPayload::Camera(camera_payload(g, &r.image)?)
            }
            (SensorGeometry::JointEncoder(g), Reading::JointEncoder(r)) => {
                DataPayload::JointEncoder(JointEncoderDataProxy {
                    encoder_values: r.encoder_values.clone(),
                    encoder_velocity: r.encoder_velocity.clone(),
                    resolution: g.resolution.clone(),
                })
            }
            (SensorGeometry::Force6D(_), Reading::Force6D(r)) => {
                DataPayload::Force6D(Force6DDataProxy {
                    force: r.force.to_array(),
                    torque: r.torque.to_array(),
                })
            }
            (SensorGeometry::Imu(_), Reading::Imu(r)) => DataPayload::Imu(ImuDataProxy {
                rotation: r.rotation.to_array(),
                angular_velocity: r.angular_velocity.to_array(),
                linear_acceleration: r.linear_acceleration.to_array(),
                rotation_covariance: matrix3_from_slice(&r.rotation_covariance)?,
                angular_velocity_covariance: matrix3_from_slice(&r.angular_velocity_covariance)?,
                linear_acceleration_covariance: matrix3_from_slice(
                    &r.linear_acceleration_covariance,
                )?,
            }),
            (SensorGeometry::Odometry(g), Reading::Odometry(r)) => {
                DataPayload::Odometry(OdometryDataProxy {
                    pose: r.pose.to_pose(),
                    linear_velocity: r.linear_velocity.to_array(),
                    angular_velocity: r.angular_velocity.to_array(),
                    pose_covariance: matrix3_from_slice(&r.pose_covariance)?,
                    velocity_covariance: matrix3_from_slice(&r.velocity_covariance)?,
                    targetid: g.target_id.clone(),
                })
            }
            (SensorGeometry::Tactile(g), Reading::Tactile(r)) => {
                DataPayload::Tactile(TactileDataProxy {
                    forces: points(&r.forces),
                    force_covariance: matrix3_from_slice(&r.force_covariance)?,
                    positions: points(&g.positions),
                    thickness: g.thickness,
                })
            }
            (SensorGeometry::Actuator(g), Reading::Actuator(r)) => {
                DataPayload::Actuator(ActuatorDataProxy {
                    state: r.state,
                    measured_current: r.measured_current,
                    measured_temperature: r.measured_temperature,
                    applied_current: r.applied_current,
                    ..ActuatorDataProxy::with_limits(g)
                })
            }
            (geometry, reading) => {
                return Err(SensorError::TypeMismatch {
                    expected: geometry.sensor_type(),
                    actual: reading.sensor_type(),
                });
            }
        };
        Ok(Self {
            stamp: data.stamp,
            transform: Some(data.transform.to_matrix()),
            payload,
        })
    }

    /// An unfilled snapshot for a sensor with geometry `geometry`: zero stamp,
    /// no transform, geometry-derived fields populated and a black camera
    /// frame of the configured resolution.
    pub fn empty(geometry: &SensorGeometry) -> Self {
        let payload = match geometry {
            SensorGeometry::Laser(_) => DataPayload::Laser(LaserDataProxy::default()),
            SensorGeometry::Camera(g) => {
                let i = &g.intrinsics;
                DataPayload::Camera(CameraDataProxy {
                    imagedata: vec![vec![[0; 3]; g.width as usize]; g.height as usize],
                    kk: calibration_matrix(i.fx, i.fy, i.cx, i.cy),
                    intrinsics: CameraIntrinsicsProxy::from_native(i),
                })
            }
            SensorGeometry::JointEncoder(g) => DataPayload::JointEncoder(JointEncoderDataProxy {
                resolution: g.resolution.clone(),
                ..JointEncoderDataProxy::default()
            }),
            SensorGeometry::Force6D(_) => DataPayload::Force6D(Force6DDataProxy::default()),
            SensorGeometry::Imu(_) => DataPayload::Imu(ImuDataProxy::default()),
            SensorGeometry::Odometry(g) => DataPayload::Odometry(OdometryDataProxy {
                targetid: g.target_id.clone(),
                ..OdometryDataProxy::default()
            }),
            SensorGeometry::Tactile(g) => DataPayload::Tactile(TactileDataProxy {
                positions: points(&g.positions),
                thickness: g.thickness,
                ..TactileDataProxy::default()
            }),
            SensorGeometry::Actuator(g) => {
                DataPayload::Actuator(ActuatorDataProxy::with_limits(g))
            }
        };
        Self {
            stamp: 0,
            transform: None,
            payload,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Host attributes
// ────────────────────────────────────────────────────────────────────────────

pub(crate) const SENSOR_DATA_ATTRS: &[AttrSpec] = &[AttrSpec::ro("type"), AttrSpec::ro("stamp")];

pub(crate) const LASER_DATA_ATTRS: &[AttrSpec] = &[
    AttrSpec::ro("type"),
    AttrSpec::ro("stamp"),
    AttrSpec::ro("transform"),
    AttrSpec::ro("positions"),
    AttrSpec::ro("ranges"),
    AttrSpec::ro("intensity"),
];

pub(crate) const CAMERA_DATA_ATTRS: &[AttrSpec] = &[
    AttrSpec::ro("type"),
    AttrSpec::ro("stamp"),
    AttrSpec::ro("transform"),
    AttrSpec::ro("imagedata"),
    AttrSpec::ro("KK"),
    AttrSpec::ro("intrinsics"),
];

pub(crate) const JOINT_ENCODER_DATA_ATTRS: &[AttrSpec] = &[
    AttrSpec::ro("type"),
    AttrSpec::ro("stamp"),
    AttrSpec::ro("transform"),
    AttrSpec::ro("encoderValues"),
    AttrSpec::ro("encoderVelocity"),
    AttrSpec::ro("resolution"),
];

pub(crate) const FORCE6D_DATA_ATTRS: &[AttrSpec] = &[
    AttrSpec::ro("type"),
    AttrSpec::ro("stamp"),
    AttrSpec::ro("transform"),
    AttrSpec::ro("force"),
    AttrSpec::ro("torque"),
];

pub(crate) const IMU_DATA_ATTRS: &[AttrSpec] = &[
    AttrSpec::ro("type"),
    AttrSpec::ro("stamp"),
    AttrSpec::ro("transform"),
    AttrSpec::ro("rotation"),
    AttrSpec::ro("angular_velocity"),
    AttrSpec::ro("linear_acceleration"),
    AttrSpec::ro("rotation_covariance"),
    AttrSpec::ro("angular_velocity_covariance"),
    AttrSpec::ro("linear_acceleration_covariance"),
];

pub(crate) const ODOMETRY_DATA_ATTRS: &[AttrSpec] = &[
    AttrSpec::ro("type"),
    AttrSpec::ro("stamp"),
    AttrSpec::ro("transform"),
    AttrSpec::ro("pose"),
    AttrSpec::ro("linear_velocity"),
    AttrSpec::ro("angular_velocity"),
    AttrSpec::ro("pose_covariance"),
    AttrSpec::ro("velocity_covariance"),
    AttrSpec::ro("targetid"),
];

pub(crate) const TACTILE_DATA_ATTRS: &[AttrSpec] = &[
    AttrSpec::ro("type"),
    AttrSpec::ro("stamp"),
    AttrSpec::ro("transform"),
    AttrSpec::ro("forces"),
    AttrSpec::ro("force_covariance"),
    AttrSpec::ro("positions"),
    AttrSpec::ro("thickness"),
];

pub(crate) const ACTUATOR_DATA_ATTRS: &[AttrSpec] = &[
    AttrSpec::ro("type"),
    AttrSpec::ro("stamp"),
    AttrSpec::ro("transform"),
    AttrSpec::ro("state"),
    AttrSpec::ro("measuredcurrent"),
    AttrSpec::ro("measuredtemperature"),
    AttrSpec::ro("appliedcurrent"),
    AttrSpec::ro("maxtorque"),
    AttrSpec::ro("maxcurrent"),
    AttrSpec::ro("nominalcurrent"),
    AttrSpec::ro("maxvelocity"),
    AttrSpec::ro("maxacceleration"),
    AttrSpec::ro("maxjerk"),
    AttrSpec::ro("staticfriction"),
    AttrSpec::ro("viscousfriction"),
];

/// Host class name of a data snapshot of `sensor_type`.
pub fn data_class_name(sensor_type: SensorType) -> &'static str {
    match sensor_type {
        SensorType::Invalid => "SensorData",
        SensorType::Laser => "LaserSensorData",
        SensorType::Camera => "CameraSensorData",
        SensorType::JointEncoder => "JointEncoderSensorData",
        SensorType::Force6D => "Force6DSensorData",
        SensorType::Imu => "IMUSensorData",
        SensorType::Odometry => "OdometrySensorData",
        SensorType::Tactile => "TactileSensorData",
        SensorType::Actuator => "ActuatorSensorData",
    }
}

pub(crate) fn data_attrs(sensor_type: SensorType) -> &'static [AttrSpec] {
    match sensor_type {
        SensorType::Invalid => SENSOR_DATA_ATTRS,
        SensorType::Laser => LASER_DATA_ATTRS,
        SensorType::Camera => CAMERA_DATA_ATTRS,
        SensorType::JointEncoder => JOINT_ENCODER_DATA_ATTRS,
        SensorType::Force6D => FORCE6D_DATA_ATTRS,
        SensorType::Imu => IMU_DATA_ATTRS,
        SensorType::Odometry => ODOMETRY_DATA_ATTRS,
        SensorType::Tactile => TACTILE_DATA_ATTRS,
        SensorType::Actuator => ACTUATOR_DATA_ATTRS,
    }
}

impl HostObject for SensorDataProxy {
    fn host_class(&self) -> &'static str {
        data_class_name(self.sensor_type())
    }

    fn attributes(&self) -> &'static [AttrSpec] {
        data_attrs(self.sensor_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindingError;
    use sensorbridge_hal::sim::default_geometry;
    use sensorbridge_types::{CameraReading, ImuReading, Quaternion, Transform};
    use serde_json::json;

    fn sample(kind: SensorType) -> (SensorGeometry, SensorData) {
        let geometry = default_geometry(kind).unwrap();
        let mut data = SensorData::empty(kind).unwrap();
        if let (SensorGeometry::Camera(g), Reading::Camera(r)) = (&geometry, &mut data.reading) {
            r.image = vec![7; g.frame_len()];
        }
        (geometry, data)
    }

    #[test]
    fn dispatch_keeps_tag_for_every_kind() {
        for kind in SensorType::CONCRETE {
            let (geometry, data) = sample(kind);
            let proxy = SensorDataProxy::from_native(&geometry, &data).unwrap();
            assert_eq!(proxy.sensor_type(), kind);
            assert_eq!(proxy.host_class(), data_class_name(kind));
        }
    }

    #[test]
    fn mismatched_pair_is_rejected() {
        let geometry = default_geometry(SensorType::Laser).unwrap();
        let data = SensorData::empty(SensorType::Imu).unwrap();
        let err = SensorDataProxy::from_native(&geometry, &data).unwrap_err();
        assert_eq!(
            err,
            SensorError::TypeMismatch {
                expected: SensorType::Laser,
                actual: SensorType::Imu
            }
        );
    }

    #[test]
    fn covariance_is_reshaped_row_major() {
        let geometry = default_geometry(SensorType::Imu).unwrap();
        let mut data = SensorData::empty(SensorType::Imu).unwrap();
        data.reading = Reading::Imu(ImuReading {
            rotation_covariance: (1..=9).map(f64::from).collect(),
            ..ImuReading::default()
        });
        let proxy = SensorDataProxy::from_native(&geometry, &data).unwrap();
        let DataPayload::Imu(imu) = proxy.payload else {
            panic!("expected IMU payload");
        };
        let expected: Matrix3 = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        assert_eq!(imu.rotation_covariance, expected);
        assert_eq!(imu.rotation, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn short_covariance_is_a_shape_error() {
        let geometry = default_geometry(SensorType::Imu).unwrap();
        let mut data = SensorData::empty(SensorType::Imu).unwrap();
        if let Reading::Imu(r) = &mut data.reading {
            r.angular_velocity_covariance = vec![0.0; 6];
        }
        let err = SensorDataProxy::from_native(&geometry, &data).unwrap_err();
        assert_eq!(
            err,
            SensorError::Shape {
                expected: 9,
                actual: 6
            }
        );
    }

    #[test]
    fn camera_frame_must_match_resolution() {
        let geometry = default_geometry(SensorType::Camera).unwrap();
        let mut data = SensorData::empty(SensorType::Camera).unwrap();
        data.reading = Reading::Camera(CameraReading { image: vec![0; 10] });
        let err = SensorDataProxy::from_native(&geometry, &data).unwrap_err();
        assert_eq!(
            err,
            SensorError::BadImageData {
                expected: 8 * 6 * 3,
                actual: 10
            }
        );
    }

    #[test]
    fn camera_frame_is_shaped_height_width_rgb() {
        let (geometry, mut data) = sample(SensorType::Camera);
        if let Reading::Camera(r) = &mut data.reading {
            r.image[3 * 8 * 2 + 3] = 42; // row 2, column 1, red
        }
        let proxy = SensorDataProxy::from_native(&geometry, &data).unwrap();
        let DataPayload::Camera(cam) = proxy.payload else {
            panic!("expected camera payload");
        };
        assert_eq!(cam.imagedata.len(), 6);
        assert!(cam.imagedata.iter().all(|row| row.len() == 8));
        assert_eq!(cam.imagedata[2][1], [42, 7, 7]);
        assert_eq!(cam.kk, [[5.0, 0.0, 4.0], [0.0, 5.0, 3.0], [0.0, 0.0, 1.0]]);
    }

    #[test]
    fn odometry_pose_and_header_are_copied() {
        let geometry = default_geometry(SensorType::Odometry).unwrap();
        let mut data = SensorData::empty(SensorType::Odometry).unwrap();
        data.stamp = 1_500;
        data.transform = Transform::new(Quaternion::identity(), Vec3::new(1.0, 2.0, 3.0));
        if let Reading::Odometry(r) = &mut data.reading {
            r.pose = Transform::new(Quaternion::identity(), Vec3::new(4.0, 0.0, 0.0));
        }
        let proxy = SensorDataProxy::from_native(&geometry, &data).unwrap();
        assert_eq!(proxy.stamp, 1_500);
        let m = proxy.transform.unwrap();
        assert_eq!([m[0][3], m[1][3], m[2][3]], [1.0, 2.0, 3.0]);
        let DataPayload::Odometry(odo) = proxy.payload else {
            panic!("expected odometry payload");
        };
        assert_eq!(odo.pose, [1.0, 0.0, 0.0, 0.0, 4.0, 0.0, 0.0]);
        assert_eq!(odo.targetid, "base_link");
    }

    #[test]
    fn empty_snapshot_carries_geometry_fields() {
        let camera = SensorDataProxy::empty(&default_geometry(SensorType::Camera).unwrap());
        assert_eq!(camera.stamp, 0);
        assert!(camera.transform.is_none());
        let DataPayload::Camera(cam) = &camera.payload else {
            panic!("expected camera payload");
        };
        assert_eq!(cam.imagedata.len(), 6);
        assert_eq!(cam.imagedata[0], vec![[0u8; 3]; 8]);

        let actuator = SensorDataProxy::empty(&default_geometry(SensorType::Actuator).unwrap());
        assert_eq!(actuator.get_attr("maxtorque").unwrap(), json!(10.0));
        assert_eq!(actuator.get_attr("state").unwrap(), json!("Undefined"));

        for kind in SensorType::CONCRETE {
            let empty = SensorDataProxy::empty(&default_geometry(kind).unwrap());
            assert_eq!(empty.sensor_type(), kind);
        }
    }

    #[test]
    fn data_attributes_are_read_only() {
        let (geometry, data) = sample(SensorType::Force6D);
        let mut proxy = SensorDataProxy::from_native(&geometry, &data).unwrap();
        assert_eq!(proxy.get_attr("type").unwrap(), json!("Force6D"));
        assert_eq!(proxy.get_attr("stamp").unwrap(), json!(0));
        assert!(matches!(
            proxy.set_attr("force", json!([1.0, 2.0, 3.0])).unwrap_err(),
            BindingError::ReadOnly { .. }
        ));
        assert!(matches!(
            proxy.get_attr("ranges").unwrap_err(),
            BindingError::UnknownAttribute { .. }
        ));
    }

    #[test]
    fn missed_beams_read_back_as_infinite() {
        let proxy = SensorDataProxy {
            stamp: 7,
            transform: None,
            payload: DataPayload::Laser(LaserDataProxy {
                positions: vec![[0.0; 3]],
                ranges: vec![[f64::INFINITY, 0.0, 0.0]],
                intensity: vec![f64::NAN],
            }),
        };
        assert_eq!(proxy.get_attr("ranges").unwrap(), json!([["inf", 0.0, 0.0]]));
        assert_eq!(proxy.get_attr("intensity").unwrap(), json!(["nan"]));

        let value = serde_json::to_value(&proxy).unwrap();
        let back: SensorDataProxy = serde_json::from_value(value).unwrap();
        let DataPayload::Laser(laser) = &back.payload else {
            panic!("expected laser payload");
        };
        assert_eq!(laser.ranges[0][0], f64::INFINITY);
        assert!(laser.intensity[0].is_nan());
    }
}
