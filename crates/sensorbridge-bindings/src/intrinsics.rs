//! Camera intrinsics proxy.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sensorbridge_types::{CameraIntrinsics, Matrix3};

use crate::host_float;
use crate::namespace::{AttrSpec, HostObject};

/// Host view of [`CameraIntrinsics`]: the pinhole parameters folded into a
/// 3×3 calibration matrix `K = [[fx, 0, cx], [0, fy, cy], [0, 0, 1]]`.
///
/// The default carries the all-zero pinhole parameters, so `K` is
/// `[[0, 0, 0], [0, 0, 0], [0, 0, 1]]` rather than absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CameraIntrinsicsProxy {
    /// `None` stands for an uncalibrated camera.
    #[serde(rename = "K")]
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub k: Option<Matrix3>,
    pub distortion_model: String,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub distortion_coeffs: Vec<f64>,
    #[serde(
        serialize_with = "host_float::serialize",
        deserialize_with = "host_float::deserialize"
    )]
    pub focal_length: f64,
}

impl Default for CameraIntrinsicsProxy {
    fn default() -> Self {
        Self::from_native(&CameraIntrinsics::default())
    }
}

pub(crate) const INTRINSICS_ATTRS: &[AttrSpec] = &[
    AttrSpec::rw("K"),
    AttrSpec::rw("distortion_model"),
    AttrSpec::rw("distortion_coeffs"),
    AttrSpec::rw("focal_length"),
];

/// Lay out pinhole parameters as a calibration matrix.
pub fn calibration_matrix(fx: f64, fy: f64, cx: f64, cy: f64) -> Matrix3 {
    [[fx, 0.0, cx], [0.0, fy, cy], [0.0, 0.0, 1.0]]
}

impl CameraIntrinsicsProxy {
    /// Intrinsics with the given pinhole parameters and no distortion.
    pub fn from_params(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self {
            k: Some(calibration_matrix(fx, fy, cx, cy)),
            ..Self::default()
        }
    }

    pub fn from_native(native: &CameraIntrinsics) -> Self {
        Self {
            k: Some(calibration_matrix(
                native.fx, native.fy, native.cx, native.cy,
            )),
            distortion_model: native.distortion_model.clone(),
            distortion_coeffs: native.distortion_coeffs.clone(),
            focal_length: native.focal_length,
        }
    }

    /// Read the pinhole parameters back out of `K`.  An absent `K` yields
    /// zero for all four.
    pub fn to_native(&self) -> CameraIntrinsics {
        let (fx, fy, cx, cy) = match &self.k {
            Some(k) => (k[0][0], k[1][1], k[0][2], k[1][2]),
            None => (0.0, 0.0, 0.0, 0.0),
        };
        CameraIntrinsics {
            fx,
            fy,
            cx,
            cy,
            distortion_model: self.distortion_model.clone(),
            distortion_coeffs: self.distortion_coeffs.clone(),
            focal_length: self.focal_length,
        }
    }
}

impl HostObject for CameraIntrinsicsProxy {
    fn host_class(&self) -> &'static str {
        "CameraIntrinsics"
    }

    fn attributes(&self) -> &'static [AttrSpec] {
        INTRINSICS_ATTRS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_params_lays_out_calibration_matrix() {
        let k = CameraIntrinsicsProxy::from_params(500.0, 510.0, 320.0, 240.0)
            .k
            .unwrap();
        assert_eq!(k[0][0], 500.0);
        assert_eq!(k[1][1], 510.0);
        assert_eq!(k[0][2], 320.0);
        assert_eq!(k[1][2], 240.0);
        assert_eq!(k[2][2], 1.0);
        for (r, c) in [(0, 1), (1, 0), (2, 0), (2, 1)] {
            assert_eq!(k[r][c], 0.0, "K[{r}][{c}] must be zero");
        }
    }

    #[test]
    fn native_roundtrip_preserves_every_field() {
        let native = CameraIntrinsics {
            fx: 612.5,
            fy: 611.25,
            cx: 319.75,
            cy: 241.125,
            distortion_model: "opencv".to_string(),
            distortion_coeffs: vec![0.1, -0.02, 0.0, 0.0, 0.001],
            focal_length: 0.0042,
        };
        let proxy = CameraIntrinsicsProxy::from_native(&native);
        assert_eq!(proxy.to_native(), native);
        assert_eq!(CameraIntrinsicsProxy::from_native(&proxy.to_native()), proxy);
    }

    #[test]
    fn absent_k_yields_zero_parameters() {
        let proxy = CameraIntrinsicsProxy {
            k: None,
            focal_length: 0.01,
            ..CameraIntrinsicsProxy::default()
        };
        let native = proxy.to_native();
        assert_eq!((native.fx, native.fy, native.cx, native.cy), (0.0, 0.0, 0.0, 0.0));
        assert_eq!(native.focal_length, 0.01);
    }

    #[test]
    fn default_exposes_zero_calibration_matrix() {
        let proxy = CameraIntrinsicsProxy::default();
        assert_eq!(
            proxy.k,
            Some([[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0]])
        );
        assert_eq!(proxy.to_native(), CameraIntrinsics::default());

        let from_host: CameraIntrinsicsProxy = serde_json::from_value(json!({})).unwrap();
        assert_eq!(from_host, proxy);
    }

    #[test]
    fn k_is_published_under_host_name() {
        let mut proxy = CameraIntrinsicsProxy::from_params(1.0, 2.0, 3.0, 4.0);
        assert_eq!(
            proxy.get_attr("K").unwrap(),
            json!([[1.0, 0.0, 3.0], [0.0, 2.0, 4.0], [0.0, 0.0, 1.0]])
        );
        proxy.set_attr("K", json!(null)).unwrap();
        assert!(proxy.k.is_none());
    }
}
