//! Geometry proxies: host-side mirrors of [`SensorGeometry`].
//!
//! Every proxy field is read-write from the host.  Edits stay local to the
//! proxy until it is handed back through `SetSensorGeometry`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sensorbridge_types::{
    ActuatorGeometry, CameraGeometry, Force6DGeometry, ImuGeometry, JointEncoderGeometry,
    LaserGeometry, OdometryGeometry, SensorGeometry, SensorType, TactileGeometry, Vec3,
};

use crate::intrinsics::CameraIntrinsicsProxy;
use crate::host_float;
use crate::namespace::{AttrSpec, HostObject};

// ────────────────────────────────────────────────────────────────────────────
// Per-kind proxies
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CameraGeomProxy {
    pub hardware_id: String,
    pub intrinsics: CameraIntrinsicsProxy,
    pub width: u32,
    pub height: u32,
    pub sensor_reference: String,
    pub target_region: String,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub measurement_time: f64,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub gain: f64,
}

impl Default for CameraGeomProxy {
    fn default() -> Self {
        Self {
            hardware_id: String::new(),
            intrinsics: CameraIntrinsicsProxy::default(),
            width: 0,
            height: 0,
            sensor_reference: String::new(),
            target_region: String::new(),
            measurement_time: 1.0,
            gain: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LaserGeomProxy {
    /// `[horizontal, vertical]`
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub min_angle: [f64; 2],
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub max_angle: [f64; 2],
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub min_range: f64,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub max_range: f64,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub time_increment: f64,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub time_scan: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct JointEncoderGeomProxy {
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub resolution: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Force6DGeomProxy {}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ImuGeomProxy {
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub time_measurement: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OdometryGeomProxy {
    pub targetid: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TactileGeomProxy {
    /// Taxel positions, N×3.
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
#[serde(default)]
pub struct ActuatorGeomProxy {
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

pub(crate) const CAMERA_GEOM_ATTRS: &[AttrSpec] = &[
    AttrSpec::rw("intrinsics"),
    AttrSpec::rw("hardware_id"),
    AttrSpec::rw("width"),
    AttrSpec::rw("height"),
    AttrSpec::rw("sensor_reference"),
    AttrSpec::rw("target_region"),
    AttrSpec::rw("measurement_time"),
    AttrSpec::rw("gain"),
    // Deprecated spelling kept for older scripts.
    AttrSpec::alias("KK", "intrinsics"),
];

pub(crate) const LASER_GEOM_ATTRS: &[AttrSpec] = &[
    AttrSpec::rw("min_angle"),
    AttrSpec::rw("max_angle"),
    AttrSpec::rw("min_range"),
    AttrSpec::rw("max_range"),
    AttrSpec::rw("time_increment"),
    AttrSpec::rw("time_scan"),
];

pub(crate) const JOINT_ENCODER_GEOM_ATTRS: &[AttrSpec] = &[AttrSpec::rw("resolution")];

pub(crate) const FORCE6D_GEOM_ATTRS: &[AttrSpec] = &[];

pub(crate) const IMU_GEOM_ATTRS: &[AttrSpec] = &[AttrSpec::rw("time_measurement")];

pub(crate) const ODOMETRY_GEOM_ATTRS: &[AttrSpec] = &[AttrSpec::rw("targetid")];

pub(crate) const TACTILE_GEOM_ATTRS: &[AttrSpec] =
    &[AttrSpec::rw("positions"), AttrSpec::rw("thickness")];

pub(crate) const ACTUATOR_GEOM_ATTRS: &[AttrSpec] = &[
    AttrSpec::rw("maxtorque"),
    AttrSpec::rw("maxcurrent"),
    AttrSpec::rw("nominalcurrent"),
    AttrSpec::rw("maxvelocity"),
    AttrSpec::rw("maxacceleration"),
    AttrSpec::rw("maxjerk"),
    AttrSpec::rw("staticfriction"),
    AttrSpec::rw("viscousfriction"),
];

macro_rules! host_object {
    ($ty:ty, $class:literal, $attrs:ident) => {
        impl HostObject for $ty {
            fn host_class(&self) -> &'static str {
                $class
            }
            fn attributes(&self) -> &'static [AttrSpec] {
                $attrs
            }
        }
    };
}

host_object!(CameraGeomProxy, "CameraGeomData", CAMERA_GEOM_ATTRS);
host_object!(LaserGeomProxy, "LaserGeomData", LASER_GEOM_ATTRS);
host_object!(JointEncoderGeomProxy, "JointEncoderGeomData", JOINT_ENCODER_GEOM_ATTRS);
host_object!(Force6DGeomProxy, "Force6DGeomData", FORCE6D_GEOM_ATTRS);
host_object!(ImuGeomProxy, "IMUGeomData", IMU_GEOM_ATTRS);
host_object!(OdometryGeomProxy, "OdometryGeomData", ODOMETRY_GEOM_ATTRS);
host_object!(TactileGeomProxy, "TactileGeomData", TACTILE_GEOM_ATTRS);
host_object!(ActuatorGeomProxy, "ActuatorGeomData", ACTUATOR_GEOM_ATTRS);

// ────────────────────────────────────────────────────────────────────────────
// GeometryProxy
// ────────────────────────────────────────────────────────────────────────────

/// Host view of any [`SensorGeometry`].  The host value carries the kind in
/// a `"type"` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum GeometryProxy {
    Laser(LaserGeomProxy),
    Camera(CameraGeomProxy),
    JointEncoder(JointEncoderGeomProxy),
    Force6D(Force6DGeomProxy),
    #[serde(rename = "IMU")]
    Imu(ImuGeomProxy),
    Odometry(OdometryGeomProxy),
    Tactile(TactileGeomProxy),
    Actuator(ActuatorGeomProxy),
}

impl GeometryProxy {
    /// `GetType()` on the host.
    pub fn sensor_type(&self) -> SensorType {
        match self {
            GeometryProxy::Laser(_) => SensorType::Laser,
            GeometryProxy::Camera(_) => SensorType::Camera,
            GeometryProxy::JointEncoder(_) => SensorType::JointEncoder,
            GeometryProxy::Force6D(_) => SensorType::Force6D,
            GeometryProxy::Imu(_) => SensorType::Imu,
            GeometryProxy::Odometry(_) => SensorType::Odometry,
            GeometryProxy::Tactile(_) => SensorType::Tactile,
            GeometryProxy::Actuator(_) => SensorType::Actuator,
        }
    }

    /// Default-valued proxy of the given kind, or `None` for `Invalid`.
    pub fn default_for(sensor_type: SensorType) -> Option<Self> {
        let proxy = match sensor_type {
            SensorType::Invalid => return None,
            SensorType::Laser => GeometryProxy::Laser(LaserGeomProxy::default()),
            SensorType::Camera => GeometryProxy::Camera(CameraGeomProxy::default()),
            SensorType::JointEncoder => {
                GeometryProxy::JointEncoder(JointEncoderGeomProxy::default())
            }
            SensorType::Force6D => GeometryProxy::Force6D(Force6DGeomProxy::default()),
            SensorType::Imu => GeometryProxy::Imu(ImuGeomProxy::default()),
            SensorType::Odometry => GeometryProxy::Odometry(OdometryGeomProxy::default()),
            SensorType::Tactile => GeometryProxy::Tactile(TactileGeomProxy::default()),
            SensorType::Actuator => GeometryProxy::Actuator(ActuatorGeomProxy::default()),
        };
        Some(proxy)
    }

    pub fn from_native(native: &SensorGeometry) -> Self {
        match native {
            SensorGeometry::Laser(g) => GeometryProxy::Laser(LaserGeomProxy {
                min_angle: g.min_angle,
                max_angle: g.max_angle,
                min_range: g.min_range,
                max_range: g.max_range,
                time_increment: g.time_increment,
                time_scan: g.time_scan,
            }),
            SensorGeometry::Camera(g) => GeometryProxy::Camera(CameraGeomProxy {
                hardware_id: g.hardware_id.clone(),
                intrinsics: CameraIntrinsicsProxy::from_native(&g.intrinsics),
                width: g.width,
                height: g.height,
                sensor_reference: g.sensor_reference.clone(),
                target_region: g.target_region.clone(),
                measurement_time: g.measurement_time,
                gain: g.gain,
            }),
            SensorGeometry::JointEncoder(g) => {
                GeometryProxy::JointEncoder(JointEncoderGeomProxy {
                    resolution: g.resolution.clone(),
                })
            }
            SensorGeometry::Force6D(_) => GeometryProxy::Force6D(Force6DGeomProxy {}),
            SensorGeometry::Imu(g) => GeometryProxy::Imu(ImuGeomProxy {
                time_measurement: g.time_measurement,
            }),
            SensorGeometry::Odometry(g) => GeometryProxy::Odometry(OdometryGeomProxy {
                targetid: g.target_id.clone(),
            }),
            SensorGeometry::Tactile(g) => GeometryProxy::Tactile(TactileGeomProxy {
                positions: g.positions.iter().map(|p| p.to_array()).collect(),
                thickness: g.thickness,
            }),
            SensorGeometry::Actuator(g) => GeometryProxy::Actuator(ActuatorGeomProxy {
                max_torque: g.max_torque,
                max_current: g.max_current,
                nominal_current: g.nominal_current,
                max_velocity: g.max_velocity,
                max_acceleration: g.max_acceleration,
                max_jerk: g.max_jerk,
                static_friction: g.static_friction,
                viscous_friction: g.viscous_friction,
            }),
        }
    }

    pub fn to_native(&self) -> SensorGeometry {
        match self {
            GeometryProxy::Laser(p) => SensorGeometry::Laser(LaserGeometry {
                min_angle: p.min_angle,
                max_angle: p.max_angle,
                min_range: p.min_range,
                max_range: p.max_range,
                time_increment: p.time_increment,
                time_scan: p.time_scan,
            }),
            GeometryProxy::Camera(p) => SensorGeometry::Camera(CameraGeometry {
                hardware_id: p.hardware_id.clone(),
                width: p.width,
                height: p.height,
                intrinsics: p.intrinsics.to_native(),
                sensor_reference: p.sensor_reference.clone(),
                target_region: p.target_region.clone(),
                measurement_time: p.measurement_time,
                gain: p.gain,
            }),
            GeometryProxy::JointEncoder(p) => SensorGeometry::JointEncoder(JointEncoderGeometry {
                resolution: p.resolution.clone(),
            }),
            GeometryProxy::Force6D(_) => SensorGeometry::Force6D(Force6DGeometry),
            GeometryProxy::Imu(p) => SensorGeometry::Imu(ImuGeometry {
                time_measurement: p.time_measurement,
            }),
            GeometryProxy::Odometry(p) => SensorGeometry::Odometry(OdometryGeometry {
                target_id: p.targetid.clone(),
            }),
            GeometryProxy::Tactile(p) => SensorGeometry::Tactile(TactileGeometry {
                positions: p.positions.iter().copied().map(Vec3::from_array).collect(),
                thickness: p.thickness,
            }),
            GeometryProxy::Actuator(p) => SensorGeometry::Actuator(ActuatorGeometry {
                max_torque: p.max_torque,
                max_current: p.max_current,
                nominal_current: p.nominal_current,
                max_velocity: p.max_velocity,
                max_acceleration: p.max_acceleration,
                max_jerk: p.max_jerk,
                static_friction: p.static_friction,
                viscous_friction: p.viscous_friction,
            }),
        }
    }
}

impl HostObject for GeometryProxy {
    fn host_class(&self) -> &'static str {
        match self {
            GeometryProxy::Laser(p) => p.host_class(),
            GeometryProxy::Camera(p) => p.host_class(),
            GeometryProxy::JointEncoder(p) => p.host_class(),
            GeometryProxy::Force6D(p) => p.host_class(),
            GeometryProxy::Imu(p) => p.host_class(),
            GeometryProxy::Odometry(p) => p.host_class(),
            GeometryProxy::Tactile(p) => p.host_class(),
            GeometryProxy::Actuator(p) => p.host_class(),
        }
    }

    fn attributes(&self) -> &'static [AttrSpec] {
        match self {
            GeometryProxy::Laser(p) => p.attributes(),
            GeometryProxy::Camera(p) => p.attributes(),
            GeometryProxy::JointEncoder(p) => p.attributes(),
            GeometryProxy::Force6D(p) => p.attributes(),
            GeometryProxy::Imu(p) => p.attributes(),
            GeometryProxy::Odometry(p) => p.attributes(),
            GeometryProxy::Tactile(p) => p.attributes(),
            GeometryProxy::Actuator(p) => p.attributes(),
        }
    }
}
