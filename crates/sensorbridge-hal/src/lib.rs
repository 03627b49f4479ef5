//! `sensorbridge-hal` – native sensor boundary.
//!
//! # Modules
//!
//! - [`sensor`] – [`Sensor`][sensor::Sensor]: the trait every native sensor
//!   driver implements and the binding layer consumes.
//! - [`registry`] – [`SensorRegistry`][registry::SensorRegistry]: creates
//!   sensors by driver interface name for one environment.
//! - [`sim`] – [`SimSensor`][sim::SimSensor] and the
//!   [`SimRegistry`][sim::SimRegistry] builder: deterministic simulated
//!   sensors for headless tests.

pub mod registry;
pub mod sensor;
pub mod sim;

pub use registry::{SensorFactory, SensorRegistry};
pub use sensor::Sensor;
pub use sim::{SimRegistry, SimSensor};
