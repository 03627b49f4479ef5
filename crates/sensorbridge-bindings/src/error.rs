//! Errors raised at the host boundary.

use sensorbridge_types::SensorError;
use thiserror::Error;

/// Errors that can arise while servicing a host call.
#[derive(Error, Debug)]
pub enum BindingError {
    /// The native side or the marshaling layer rejected the request.
    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error("'{class}' object has no attribute '{name}'")]
    UnknownAttribute { class: String, name: String },

    #[error("attribute '{name}' of '{class}' is read-only")]
    ReadOnly { class: String, name: String },

    #[error("'{class}' object has no method '{name}'")]
    UnknownMethod { class: String, name: String },

    /// A host argument was missing, surplus or of the wrong shape.
    #[error("{method}: {reason}")]
    BadArgument { method: String, reason: String },

    /// A proxy could not be converted to or from a host value.
    #[error("host value conversion failed: {0}")]
    Conversion(#[from] serde_json::Error),
}

impl BindingError {
    pub(crate) fn bad_argument(method: &str, reason: impl Into<String>) -> Self {
        BindingError::BadArgument {
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}
