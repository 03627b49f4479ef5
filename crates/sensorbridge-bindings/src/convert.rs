//! Host value → native argument conversion.
//!
//! Host enums arrive either as their raw integer value or as the constant's
//! name (`5` or `"IMU"`); geometries arrive as JSON objects; transforms as a
//! 4×4 matrix or a 7-element pose.

use serde::Deserialize;
use serde_json::Value;
use sensorbridge_types::{
    ConfigureCommand, Matrix4, Pose, SensorError, SensorType, Transform,
};

use crate::error::BindingError;
use crate::geometry::{
    ActuatorGeomProxy, CameraGeomProxy, Force6DGeomProxy, GeometryProxy, ImuGeomProxy,
    JointEncoderGeomProxy, LaserGeomProxy, OdometryGeomProxy, TactileGeomProxy,
};

/// A sensor pose as the host may pass it.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TransformArg {
    Matrix(Matrix4),
    /// `[qw, qx, qy, qz, x, y, z]`
    Pose(Pose),
}

impl TransformArg {
    pub fn to_transform(self) -> Transform {
        match self {
            TransformArg::Matrix(m) => Transform::from_matrix(&m),
            TransformArg::Pose(p) => Transform::from_pose(&p),
        }
    }
}

impl From<TransformArg> for Transform {
    fn from(arg: TransformArg) -> Self {
        arg.to_transform()
    }
}

fn raw_enum(method: &str, value: &Value) -> Result<Result<i32, String>, BindingError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|raw| i32::try_from(raw).ok())
            .map(Ok)
            .ok_or_else(|| BindingError::bad_argument(method, format!("{n} is not an enum value"))),
        Value::String(s) => Ok(Err(s.clone())),
        other => Err(BindingError::bad_argument(
            method,
            format!("expected an enum value, got {other}"),
        )),
    }
}

/// Decode a host `Type` argument.
///
/// # Errors
///
/// [`SensorError::UnsupportedType`] for an unknown raw tag, or
/// [`BindingError::BadArgument`] for an unknown name or a non-enum value.
pub fn sensor_type_arg(method: &str, value: &Value) -> Result<SensorType, BindingError> {
    match raw_enum(method, value)? {
        Ok(raw) => Ok(SensorType::try_from(raw)?),
        Err(name) => SensorType::from_host_name(&name)
            .ok_or_else(|| BindingError::bad_argument(method, format!("unknown Type '{name}'"))),
    }
}

/// Decode a host `ConfigureCommand` argument.
pub fn command_arg(method: &str, value: &Value) -> Result<ConfigureCommand, BindingError> {
    match raw_enum(method, value)? {
        Ok(raw) => Ok(ConfigureCommand::try_from(raw)?),
        Err(name) => ConfigureCommand::from_host_name(&name).ok_or_else(|| {
            BindingError::bad_argument(method, format!("unknown ConfigureCommand '{name}'"))
        }),
    }
}

pub fn transform_arg(method: &str, value: &Value) -> Result<TransformArg, BindingError> {
    TransformArg::deserialize(value).map_err(|_| {
        BindingError::bad_argument(method, "expected a 4x4 matrix or a 7-element pose")
    })
}

/// Build a geometry proxy of kind `sensor_type` from a host object.
///
/// Missing keys take their defaults.  A `"type"` key, if present, must agree
/// with `sensor_type`.
///
/// # Errors
///
/// - [`SensorError::UnsupportedType`] for `Invalid`.
/// - [`SensorError::TypeMismatch`] when the value names another kind.
/// - [`BindingError::Conversion`] when a field has the wrong shape.
pub fn geometry_from_host(
    sensor_type: SensorType,
    value: &Value,
) -> Result<GeometryProxy, BindingError> {
    let mut object = value.clone();
    if let Some(map) = object.as_object_mut()
        && let Some(tag) = map.remove("type")
    {
        let named = sensor_type_arg("geometry", &tag)?;
        if named != sensor_type {
            return Err(SensorError::TypeMismatch {
                expected: sensor_type,
                actual: named,
            }
            .into());
        }
    }
    let proxy = match sensor_type {
        SensorType::Invalid => {
            return Err(SensorError::UnsupportedType(sensor_type.as_raw()).into());
        }
        SensorType::Laser => GeometryProxy::Laser(LaserGeomProxy::deserialize(object)?),
        SensorType::Camera => GeometryProxy::Camera(CameraGeomProxy::deserialize(object)?),
        SensorType::JointEncoder => {
            GeometryProxy::JointEncoder(JointEncoderGeomProxy::deserialize(object)?)
        }
        SensorType::Force6D => GeometryProxy::Force6D(Force6DGeomProxy::deserialize(object)?),
        SensorType::Imu => GeometryProxy::Imu(ImuGeomProxy::deserialize(object)?),
        SensorType::Odometry => GeometryProxy::Odometry(OdometryGeomProxy::deserialize(object)?),
        SensorType::Tactile => GeometryProxy::Tactile(TactileGeomProxy::deserialize(object)?),
        SensorType::Actuator => GeometryProxy::Actuator(ActuatorGeomProxy::deserialize(object)?),
    };
    Ok(proxy)
}

/// Build a geometry proxy from a host object carrying its own `"type"` key.
pub fn tagged_geometry_from_host(value: &Value) -> Result<GeometryProxy, BindingError> {
    let tag = value.get("type").ok_or_else(|| {
        BindingError::bad_argument("SetSensorGeometry", "geometry has no 'type'")
    })?;
    let sensor_type = sensor_type_arg("SetSensorGeometry", tag)?;
    geometry_from_host(sensor_type, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sensor_type_arg_accepts_raw_and_name() {
        assert_eq!(sensor_type_arg("t", &json!(5)).unwrap(), SensorType::Imu);
        assert_eq!(sensor_type_arg("t", &json!("IMU")).unwrap(), SensorType::Imu);
        assert_eq!(sensor_type_arg("t", &json!(0)).unwrap(), SensorType::Invalid);
    }

    #[test]
    fn unknown_raw_tag_is_unsupported_type() {
        let err = sensor_type_arg("t", &json!(42)).unwrap_err();
        assert!(matches!(
            err,
            BindingError::Sensor(SensorError::UnsupportedType(42))
        ));
        assert!(matches!(
            sensor_type_arg("t", &json!("Sonar")).unwrap_err(),
            BindingError::BadArgument { .. }
        ));
        assert!(matches!(
            sensor_type_arg("t", &json!([1])).unwrap_err(),
            BindingError::BadArgument { .. }
        ));
    }

    #[test]
    fn command_arg_uses_hex_values() {
        assert_eq!(command_arg("c", &json!(0x10)).unwrap(), ConfigureCommand::PowerOn);
        assert_eq!(
            command_arg("c", &json!("RenderDataCheck")).unwrap(),
            ConfigureCommand::RenderDataCheck
        );
        assert!(matches!(
            command_arg("c", &json!(0x22)).unwrap_err(),
            BindingError::Sensor(SensorError::UnsupportedCommand(0x22))
        ));
    }

    #[test]
    fn transform_arg_accepts_matrix_or_pose() {
        let pose = transform_arg("t", &json!([1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0])).unwrap();
        assert!(matches!(pose, TransformArg::Pose(_)));
        assert_eq!(pose.to_transform().trans.y, 2.0);

        let matrix = transform_arg(
            "t",
            &json!([
                [1.0, 0.0, 0.0, 4.0],
                [0.0, 1.0, 0.0, 5.0],
                [0.0, 0.0, 1.0, 6.0],
                [0.0, 0.0, 0.0, 1.0]
            ]),
        )
        .unwrap();
        assert_eq!(Transform::from(matrix).trans.z, 6.0);
        assert!(transform_arg("t", &json!([1.0, 2.0])).is_err());
    }

    #[test]
    fn geometry_from_host_fills_defaults() {
        let proxy = geometry_from_host(SensorType::Camera, &json!({"width": 640})).unwrap();
        let GeometryProxy::Camera(cam) = proxy else {
            panic!("expected camera");
        };
        assert_eq!(cam.width, 640);
        assert_eq!(cam.gain, 1.0);
    }

    #[test]
    fn geometry_from_host_rejects_invalid_and_mismatch() {
        assert!(matches!(
            geometry_from_host(SensorType::Invalid, &json!({})).unwrap_err(),
            BindingError::Sensor(SensorError::UnsupportedType(0))
        ));
        assert!(matches!(
            geometry_from_host(SensorType::Laser, &json!({"type": "IMU"})).unwrap_err(),
            BindingError::Sensor(SensorError::TypeMismatch { .. })
        ));
        assert!(matches!(
            geometry_from_host(SensorType::Laser, &json!({"min_range": "near"})).unwrap_err(),
            BindingError::Conversion(_)
        ));
    }

    #[test]
    fn tagged_geometry_uses_embedded_type() {
        let proxy =
            tagged_geometry_from_host(&json!({"type": "Odometry", "targetid": "base"})).unwrap();
        assert_eq!(proxy.sensor_type(), SensorType::Odometry);
        assert!(tagged_geometry_from_host(&json!({"targetid": "base"})).is_err());
    }
}
