//! Publishing the sensor API into a host [`Module`] and serving host calls.
//!
//! [`register_sensor_module`] declares every class, enum and function.
//! [`SensorObject`] is the host-side instance of class `Sensor`: it binds
//! positional arguments against the declared signatures and routes each
//! method to the [`SensorHandle`].

use std::sync::OnceLock;

use serde_json::{Value, json};
use sensorbridge_hal::SensorRegistry;
use sensorbridge_types::{ActuatorState, ConfigureCommand, SensorType};
use tracing::debug;

use crate::convert::{command_arg, sensor_type_arg, tagged_geometry_from_host, transform_arg};
use crate::data::{SensorDataProxy, data_attrs, data_class_name};
use crate::error::BindingError;
use crate::geometry::{
    ACTUATOR_GEOM_ATTRS, ActuatorGeomProxy, CAMERA_GEOM_ATTRS, CameraGeomProxy,
    FORCE6D_GEOM_ATTRS, Force6DGeomProxy, GeometryProxy, IMU_GEOM_ATTRS, ImuGeomProxy,
    JOINT_ENCODER_GEOM_ATTRS, JointEncoderGeomProxy, LASER_GEOM_ATTRS, LaserGeomProxy,
    ODOMETRY_GEOM_ATTRS, OdometryGeomProxy, TACTILE_GEOM_ATTRS, TactileGeomProxy,
};
use crate::intrinsics::{CameraIntrinsicsProxy, INTRINSICS_ATTRS};
use crate::namespace::{ClassDef, EnumDef, MethodDef, Module, ParamDef};
use crate::sensor::SensorHandle;

pub const SENSOR_CLASS: &str = "Sensor";
pub const SENSOR_DATA_CLASS: &str = "SensorData";
pub const SENSOR_GEOMETRY_CLASS: &str = "SensorGeometry";

// ────────────────────────────────────────────────────────────────────────────
// Class definitions
// ────────────────────────────────────────────────────────────────────────────

fn sensor_class_def() -> ClassDef {
    ClassDef::new(SENSOR_CLASS)
        .doc("A sensor attached to an environment.")
        .method(
            MethodDef::new("Configure")
                .doc("Send a power or render command; returns the driver status.")
                .param(ParamDef::required("command"))
                .param(ParamDef::optional("blocking", json!(false))),
        )
        .method(
            MethodDef::new("SimulationStep")
                .doc("Advance the sensor by timeelapsed seconds.")
                .param(ParamDef::required("timeelapsed")),
        )
        .method(
            MethodDef::new("GetSensorData")
                .doc("Latest sample of the given type; Invalid means the native type.")
                .param(ParamDef::optional("type", json!(SensorType::Invalid.as_raw()))),
        )
        .method(
            MethodDef::new("CreateSensorData")
                .doc("A new, unread sample of the given type.")
                .param(ParamDef::required("type")),
        )
        .method(
            MethodDef::new("GetSensorGeometry")
                .doc("Snapshot of the sensor geometry.")
                .param(ParamDef::required("type")),
        )
        .method(
            MethodDef::new("SetSensorGeometry")
                .doc("Replace the sensor geometry.")
                .param(ParamDef::required("geometry")),
        )
        .method(
            MethodDef::new("SetTransform")
                .doc("Set the sensor pose from a 4x4 matrix or a 7-element pose.")
                .param(ParamDef::required("transform")),
        )
        .method(MethodDef::new("GetTransform").doc("Sensor pose as a 4x4 matrix."))
        .method(MethodDef::new("GetTransformPose").doc("Sensor pose as [qw,qx,qy,qz,x,y,z]."))
        .method(MethodDef::new("GetName"))
        .method(MethodDef::new("SetName").param(ParamDef::required("name")))
        .method(
            MethodDef::new("Supports")
                .doc("Whether the sensor produces data of the given type.")
                .param(ParamDef::required("type")),
        )
        .method(MethodDef::new("__str__"))
        .method(MethodDef::new("__repr__"))
}

/// Definition of class `Sensor`, shared by every [`SensorObject`].
pub fn sensor_class() -> &'static ClassDef {
    static CLASS: OnceLock<ClassDef> = OnceLock::new();
    CLASS.get_or_init(sensor_class_def)
}

fn sensor_type_enum() -> EnumDef {
    SensorType::ALL
        .into_iter()
        .fold(EnumDef::new("Type").doc("Sensor kind."), |e, t| {
            e.value(t.host_name(), t.as_raw())
        })
}

fn configure_command_enum() -> EnumDef {
    ConfigureCommand::ALL.into_iter().fold(
        EnumDef::new("ConfigureCommand").doc("Power and render commands for Configure."),
        |e, c| e.value(c.host_name(), c.as_raw()),
    )
}

fn actuator_state_enum() -> EnumDef {
    ActuatorState::ALL.into_iter().fold(
        EnumDef::new("ActuatorState").doc("Operating state of an actuator."),
        |e, s| e.value(s.host_name(), s.as_raw()),
    )
}

fn data_subclass(sensor_type: SensorType) -> ClassDef {
    ClassDef::new(data_class_name(sensor_type))
        .base(SENSOR_DATA_CLASS)
        .attrs(data_attrs(sensor_type))
}

/// Publish the sensor API into `module`.
pub fn register_sensor_module(module: &mut Module) {
    module.add_class(sensor_class().clone());

    module.add_class(
        ClassDef::new("CameraIntrinsics")
            .doc("Pinhole camera calibration.")
            .attrs(INTRINSICS_ATTRS)
            .schema_of::<CameraIntrinsicsProxy>(),
    );

    module.add_class(
        ClassDef::new(SENSOR_DATA_CLASS)
            .doc("One timestamped sensor sample.")
            .attrs(data_attrs(SensorType::Invalid))
            .schema_of::<SensorDataProxy>(),
    );
    for kind in SensorType::CONCRETE {
        module.add_class(data_subclass(kind));
    }

    module.add_class(
        ClassDef::new(SENSOR_GEOMETRY_CLASS)
            .doc("Static configuration of a sensor.")
            .method(MethodDef::new("GetType"))
            .schema_of::<GeometryProxy>(),
    );
    let geometry_classes = [
        ClassDef::new("CameraGeomData")
            .attrs(CAMERA_GEOM_ATTRS)
            .schema_of::<CameraGeomProxy>(),
        ClassDef::new("LaserGeomData")
            .attrs(LASER_GEOM_ATTRS)
            .schema_of::<LaserGeomProxy>(),
        ClassDef::new("JointEncoderGeomData")
            .attrs(JOINT_ENCODER_GEOM_ATTRS)
            .schema_of::<JointEncoderGeomProxy>(),
        ClassDef::new("Force6DGeomData")
            .attrs(FORCE6D_GEOM_ATTRS)
            .schema_of::<Force6DGeomProxy>(),
        ClassDef::new("IMUGeomData")
            .attrs(IMU_GEOM_ATTRS)
            .schema_of::<ImuGeomProxy>(),
        ClassDef::new("OdometryGeomData")
            .attrs(ODOMETRY_GEOM_ATTRS)
            .schema_of::<OdometryGeomProxy>(),
        ClassDef::new("TactileGeomData")
            .attrs(TACTILE_GEOM_ATTRS)
            .schema_of::<TactileGeomProxy>(),
        ClassDef::new("ActuatorGeomData")
            .attrs(ACTUATOR_GEOM_ATTRS)
            .schema_of::<ActuatorGeomProxy>(),
    ];
    for class in geometry_classes {
        module.add_class(class.base(SENSOR_GEOMETRY_CLASS));
    }

    module
        .add_enum(sensor_type_enum())
        .add_enum(configure_command_enum())
        .add_enum(actuator_state_enum());

    module.add_function(
        MethodDef::new("RaveCreateSensor")
            .doc("Create a sensor by interface name; None if no such interface.")
            .param(ParamDef::required("env"))
            .param(ParamDef::required("name")),
    );

    debug!(
        module = %module.name,
        classes = module.classes.len(),
        enums = module.enums.len(),
        "sensor module registered"
    );
}

// ────────────────────────────────────────────────────────────────────────────
// Host instances
// ────────────────────────────────────────────────────────────────────────────

/// `RaveCreateSensor(env, name)`: `None` for an unknown interface.
pub fn rave_create_sensor(env: &SensorRegistry, name: &str) -> Option<SensorObject> {
    env.create(name).map(SensorObject::new)
}

/// Host instance of class `Sensor`.
#[derive(Debug)]
pub struct SensorObject {
    handle: SensorHandle,
}

impl SensorObject {
    pub fn new(sensor: Box<dyn sensorbridge_hal::Sensor>) -> Self {
        Self {
            handle: SensorHandle::new(sensor),
        }
    }

    pub fn handle(&self) -> &SensorHandle {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut SensorHandle {
        &mut self.handle
    }

    /// Invoke host method `method` with positional `args`.
    ///
    /// # Errors
    ///
    /// [`BindingError::UnknownMethod`] for a method class `Sensor` does not
    /// declare, [`BindingError::BadArgument`] for a bad argument list, and any
    /// error of the underlying [`SensorHandle`] operation.
    pub fn call(&mut self, method: &str, args: &[Value]) -> Result<Value, BindingError> {
        let def = sensor_class()
            .find_method(method)
            .ok_or_else(|| BindingError::UnknownMethod {
                class: SENSOR_CLASS.to_string(),
                name: method.to_string(),
            })?;
        let args = def.bind(args)?;
        let h = &mut self.handle;
        let value = match method {
            "Configure" => {
                let command = command_arg(method, &args[0])?;
                let blocking = args[1]
                    .as_bool()
                    .ok_or_else(|| BindingError::bad_argument(method, "blocking must be a bool"))?;
                json!(h.configure(command, blocking))
            }
            "SimulationStep" => {
                let dt = args[0]
                    .as_f64()
                    .ok_or_else(|| BindingError::bad_argument(method, "timeelapsed must be a number"))?;
                json!(h.simulation_step(dt))
            }
            "GetSensorData" => {
                let ty = sensor_type_arg(method, &args[0])?;
                serde_json::to_value(h.sensor_data(ty)?)?
            }
            "CreateSensorData" => {
                let ty = sensor_type_arg(method, &args[0])?;
                serde_json::to_value(h.create_sensor_data(ty)?)?
            }
            "GetSensorGeometry" => {
                let ty = sensor_type_arg(method, &args[0])?;
                serde_json::to_value(h.sensor_geometry(ty)?)?
            }
            "SetSensorGeometry" => {
                let geometry = tagged_geometry_from_host(&args[0])?;
                h.set_sensor_geometry(&geometry)?;
                Value::Null
            }
            "SetTransform" => {
                h.set_transform(transform_arg(method, &args[0])?);
                Value::Null
            }
            "GetTransform" => json!(h.transform()),
            "GetTransformPose" => json!(h.transform_pose()),
            "GetName" => json!(h.name()),
            "SetName" => {
                let name = args[0]
                    .as_str()
                    .ok_or_else(|| BindingError::bad_argument(method, "name must be a string"))?;
                h.set_name(name);
                Value::Null
            }
            "Supports" => {
                let ty = sensor_type_arg(method, &args[0])?;
                json!(h.supports(ty))
            }
            "__str__" => json!(h.to_string()),
            "__repr__" => json!(h.repr()),
            _ => {
                return Err(BindingError::UnknownMethod {
                    class: SENSOR_CLASS.to_string(),
                    name: method.to_string(),
                });
            }
        };
        Ok(value)
    }
}

/// Invoke a `SensorGeometry` method on `geometry`.
pub fn call_geometry(
    geometry: &GeometryProxy,
    method: &str,
    args: &[Value],
) -> Result<Value, BindingError> {
    match method {
        "GetType" if args.is_empty() => Ok(json!(geometry.sensor_type().as_raw())),
        "GetType" => Err(BindingError::bad_argument(method, "takes no arguments")),
        _ => Err(BindingError::UnknownMethod {
            class: SENSOR_GEOMETRY_CLASS.to_string(),
            name: method.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{Access, HostObject};
    use sensorbridge_hal::SimRegistry;

    fn module() -> Module {
        let mut m = Module::new("sensorbridge");
        register_sensor_module(&mut m);
        m
    }

    fn sim_env() -> SensorRegistry {
        SimRegistry::new(1).with_all().build()
    }

    #[test]
    fn registers_full_class_hierarchy() {
        let m = module();
        for kind in SensorType::CONCRETE {
            assert!(m.is_subclass(data_class_name(kind), SENSOR_DATA_CLASS), "{kind}");
            let geometry = GeometryProxy::default_for(kind).unwrap();
            assert!(
                m.is_subclass(geometry.host_class(), SENSOR_GEOMETRY_CLASS),
                "{kind}"
            );
            assert!(m.resolve_method(geometry.host_class(), "GetType").is_some());
        }
        assert!(m.class("CameraIntrinsics").is_some());
        assert!(m.class(SENSOR_CLASS).unwrap().find_method("GetTransformPose").is_some());
        assert_eq!(m.classes.len(), 1 + 1 + 9 + 9);
    }

    #[test]
    fn registers_enums_with_host_values() {
        let m = module();
        let ty = m.enum_def("Type").unwrap();
        assert_eq!(ty.lookup("IMU"), Some(5));
        assert_eq!(ty.values.len(), 9);
        let cc = m.enum_def("ConfigureCommand").unwrap();
        assert_eq!(cc.lookup("RenderDataCheck"), Some(0x23));
        assert_eq!(cc.lookup("RenderGeometryCheck"), Some(0x32));
        assert_eq!(m.enum_def("ActuatorState").unwrap().lookup("Braked"), Some(4));
        assert!(m.function("RaveCreateSensor").is_some());
    }

    #[test]
    fn data_attributes_are_read_only_and_geometry_read_write() {
        let m = module();
        let laser = m.class("LaserSensorData").unwrap();
        assert_eq!(laser.find_attr("ranges").unwrap().access, Access::ReadOnly);
        let camera = m.class("CameraGeomData").unwrap();
        assert_eq!(camera.find_attr("KK").unwrap().access, Access::ReadWrite);
        assert!(camera.schema.is_some());
    }

    #[test]
    fn create_sensor_returns_none_for_unknown_interface() {
        let env = sim_env();
        assert!(rave_create_sensor(&env, "nosuchsensor").is_none());
        assert!(rave_create_sensor(&env, "simcamera").is_some());
    }

    #[test]
    fn sensor_object_round_trip_through_host_calls() {
        let env = sim_env();
        let mut sensor = rave_create_sensor(&env, "simimu").unwrap();
        sensor.call("SetName", &[json!("imu0")]).unwrap();
        assert_eq!(sensor.call("GetName", &[]).unwrap(), json!("imu0"));
        assert_eq!(
            sensor.call("Configure", &[json!("PowerOn")]).unwrap(),
            json!(1)
        );
        assert_eq!(sensor.call("SimulationStep", &[json!(0.5)]).unwrap(), json!(true));

        let data = sensor.call("GetSensorData", &[]).unwrap();
        assert_eq!(data["type"], json!("IMU"));
        assert_eq!(data["stamp"], json!(500_000));
        assert_eq!(data["rotation_covariance"][1][1], json!(1e-4));

        assert_eq!(sensor.call("Supports", &[json!(5)]).unwrap(), json!(true));
        assert_eq!(
            sensor.call("__repr__", &[]).unwrap(),
            json!("<Environment(1).GetSensor('imu0')>")
        );
        assert_eq!(
            sensor.call("__str__", &[]).unwrap(),
            json!("<sensor:simimu - imu0>")
        );
    }

    #[test]
    fn geometry_round_trips_through_host_calls() {
        let env = sim_env();
        let mut sensor = rave_create_sensor(&env, "simlaser").unwrap();
        let mut geometry = sensor.call("GetSensorGeometry", &[json!("Invalid")]).unwrap();
        assert_eq!(geometry["type"], json!("Laser"));
        geometry["max_range"] = json!(42.0);
        sensor.call("SetSensorGeometry", &[geometry]).unwrap();
        let updated = sensor.call("GetSensorGeometry", &[json!(1)]).unwrap();
        assert_eq!(updated["max_range"], json!(42.0));
    }

    #[test]
    fn create_sensor_data_works_for_camera() {
        let env = sim_env();
        let mut sensor = rave_create_sensor(&env, "simcamera").unwrap();
        let data = sensor.call("CreateSensorData", &[json!("Camera")]).unwrap();
        assert_eq!(data["type"], json!("Camera"));
        assert_eq!(data["stamp"], json!(0));
        assert_eq!(data["transform"], Value::Null);
        assert_eq!(data["imagedata"].as_array().unwrap().len(), 6);
        assert_eq!(data["imagedata"][0].as_array().unwrap().len(), 8);
    }

    #[test]
    fn infinite_range_round_trips_through_host_calls() {
        let env = sim_env();
        let mut sensor = rave_create_sensor(&env, "simlaser").unwrap();
        let mut geometry = sensor.call("GetSensorGeometry", &[json!("Laser")]).unwrap();
        geometry["max_range"] = json!("inf");
        sensor.call("SetSensorGeometry", &[geometry]).unwrap();

        let updated = sensor.call("GetSensorGeometry", &[json!("Laser")]).unwrap();
        assert_eq!(updated["max_range"], json!("inf"));
        let mut again = updated.clone();
        again["min_range"] = json!(0.2);
        sensor.call("SetSensorGeometry", &[again]).unwrap();
        let last = sensor.call("GetSensorGeometry", &[json!(1)]).unwrap();
        assert_eq!(last["min_range"], json!(0.2));
        assert_eq!(last["max_range"], json!("inf"));
    }

    #[test]
    fn host_call_errors_are_typed() {
        let env = sim_env();
        let mut sensor = rave_create_sensor(&env, "simforce6d").unwrap();
        assert!(matches!(
            sensor.call("Explode", &[]).unwrap_err(),
            BindingError::UnknownMethod { .. }
        ));
        assert!(matches!(
            sensor.call("CreateSensorData", &[]).unwrap_err(),
            BindingError::BadArgument { .. }
        ));
        assert!(matches!(
            sensor.call("GetSensorGeometry", &[json!(99)]).unwrap_err(),
            BindingError::Sensor(sensorbridge_types::SensorError::UnsupportedType(99))
        ));
        assert!(matches!(
            sensor.call("GetSensorData", &[]).unwrap_err(),
            BindingError::Sensor(sensorbridge_types::SensorError::ReadFailed { .. })
        ));
    }

    #[test]
    fn transform_calls_accept_pose() {
        let env = sim_env();
        let mut sensor = rave_create_sensor(&env, "simodometry").unwrap();
        sensor
            .call("SetTransform", &[json!([1.0, 0.0, 0.0, 0.0, 0.5, 0.0, 0.0])])
            .unwrap();
        let m = sensor.call("GetTransform", &[]).unwrap();
        assert_eq!(m[0][3], json!(0.5));
        let pose = sensor.call("GetTransformPose", &[]).unwrap();
        assert_eq!(pose[4], json!(0.5));
    }

    #[test]
    fn geometry_get_type_returns_raw_tag() {
        let geometry = GeometryProxy::default_for(SensorType::Tactile).unwrap();
        assert_eq!(call_geometry(&geometry, "GetType", &[]).unwrap(), json!(7));
        assert!(call_geometry(&geometry, "SetType", &[]).is_err());
    }
}
