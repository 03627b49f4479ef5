//! `sensorbridge-bindings` – the sensor API as seen from a scripting host.
//!
//! # Modules
//!
//! - [`intrinsics`], [`geometry`], [`data`] – proxy records mirroring the
//!   native camera calibration, sensor geometries and sensor samples.
//! - [`host_float`] – serde helpers that carry `inf`/`nan` through host
//!   values.
//! - [`convert`] – decoding of host argument values (enum tags, transforms,
//!   geometry objects).
//! - [`sensor`] – [`SensorHandle`][sensor::SensorHandle]: adapter around one
//!   native sensor with a per-type data cache.
//! - [`namespace`] – host-agnostic description of published classes, enums
//!   and functions, plus serde-backed attribute access.
//! - [`register`] – [`register_sensor_module`][register::register_sensor_module]
//!   and [`SensorObject`][register::SensorObject], the host instance of class
//!   `Sensor`.
//!
//! # Example
//!
//! ```rust
//! use sensorbridge_bindings::{Module, register_sensor_module, rave_create_sensor};
//! use sensorbridge_hal::SimRegistry;
//! use serde_json::json;
//!
//! let mut module = Module::new("sensorbridge");
//! register_sensor_module(&mut module);
//! assert_eq!(module.enum_def("Type").unwrap().lookup("Camera"), Some(2));
//!
//! let env = SimRegistry::new(1).with_all().build();
//! let mut camera = rave_create_sensor(&env, "simcamera").expect("registered");
//! camera.call("Configure", &[json!("PowerOn")]).unwrap();
//! let data = camera.call("GetSensorData", &[]).unwrap();
//! assert_eq!(data["type"], "Camera");
//! ```

pub mod convert;
pub mod data;
pub mod error;
pub mod geometry;
pub mod host_float;
pub mod intrinsics;
pub mod namespace;
pub mod register;
pub mod sensor;

pub use data::SensorDataProxy;
pub use error::BindingError;
pub use geometry::GeometryProxy;
pub use intrinsics::CameraIntrinsicsProxy;
pub use namespace::{HostObject, Module};
pub use register::{SensorObject, rave_create_sensor, register_sensor_module};
pub use sensor::SensorHandle;
