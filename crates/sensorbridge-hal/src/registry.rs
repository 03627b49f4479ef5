//! [`SensorRegistry`] – creates sensors by driver interface name.
//!
//! Each registry belongs to one environment.  Drivers register a factory
//! under an interface name (`"simlaser"`, `"velodyne"`, …); callers then ask
//! for a fresh sensor instance by that name.  Interface names are matched
//! case-insensitively.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::sensor::Sensor;

/// Builds a new sensor owned by the environment with the given id.
pub type SensorFactory = Box<dyn Fn(u32) -> Box<dyn Sensor> + Send + Sync>;

/// Central driver factory registry for one environment.
#[derive(Default)]
pub struct SensorRegistry {
    environment_id: u32,
    factories: HashMap<String, SensorFactory>,
}

impl SensorRegistry {
    /// Create an empty registry for environment `environment_id`.
    pub fn new(environment_id: u32) -> Self {
        Self {
            environment_id,
            factories: HashMap::new(),
        }
    }

    pub fn environment_id(&self) -> u32 {
        self.environment_id
    }

    /// Register a driver factory.  Any factory previously registered under
    /// the same interface name is replaced.
    pub fn register_factory<F>(&mut self, interface: &str, factory: F)
    where
        F: Fn(u32) -> Box<dyn Sensor> + Send + Sync + 'static,
    {
        self.factories
            .insert(interface.to_ascii_lowercase(), Box::new(factory));
    }

    /// Registered interface names, sorted.
    pub fn interfaces(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instantiate the driver registered under `interface`.
    ///
    /// Returns `None` when no such interface is registered.
    pub fn create(&self, interface: &str) -> Option<Box<dyn Sensor>> {
        match self.factories.get(&interface.to_ascii_lowercase()) {
            Some(factory) => {
                debug!(interface, env = self.environment_id, "creating sensor");
                Some(factory(self.environment_id))
            }
            None => {
                warn!(interface, env = self.environment_id, "unknown sensor interface");
                None
            }
        }
    }
}
