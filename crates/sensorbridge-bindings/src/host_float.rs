//! Float fields that survive the host value model.
//!
//! JSON numbers cannot hold `inf` or `nan`; `serde_json` silently turns them
//! into `null`, which then fails to deserialize back into `f64`.  Fields
//! tagged with
//!
//! ```ignore
//! #[serde(serialize_with = "host_float::serialize", deserialize_with = "host_float::deserialize")]
//! ```
//!
//! write non-finite values as the strings `"inf"`, `"-inf"` and `"nan"` and
//! accept them (case-insensitively, plus `"+inf"`, `"infinity"` and
//! `"-infinity"`) on the way back.  Finite values stay plain numbers.  The
//! helpers work on `f64` and on any nesting of arrays, `Vec` and `Option`
//! around it.

use std::fmt;

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize, Serializer};

const INF: &str = "inf";
const NEG_INF: &str = "-inf";
const NAN: &str = "nan";

/// A value made of `f64`s that can be written to and read from a host value.
pub trait HostFloats: Sized {
    fn encode<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>;
    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error>;
}

pub fn serialize<T: HostFloats, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    value.encode(serializer)
}

pub fn deserialize<'de, T: HostFloats, D: Deserializer<'de>>(deserializer: D) -> Result<T, D::Error> {
    T::decode(deserializer)
}

struct Encoded<'a, T>(&'a T);

impl<T: HostFloats> Serialize for Encoded<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.encode(serializer)
    }
}

struct Decoded<T>(T);

impl<'de, T: HostFloats> Deserialize<'de> for Decoded<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::decode(deserializer).map(Decoded)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Impls
// ────────────────────────────────────────────────────────────────────────────

impl HostFloats for f64 {
    fn encode<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_finite() {
            serializer.serialize_f64(*self)
        } else if self.is_nan() {
            serializer.serialize_str(NAN)
        } else if self.is_sign_positive() {
            serializer.serialize_str(INF)
        } else {
            serializer.serialize_str(NEG_INF)
        }
    }

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FloatVisitor)
    }
}

impl<T: HostFloats> HostFloats for Vec<T> {
    fn encode<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(Encoded))
    }

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<Decoded<T>>::deserialize(deserializer)?;
        Ok(items.into_iter().map(|d| d.0).collect())
    }
}

impl<T: HostFloats, const N: usize> HostFloats for [T; N] {
    fn encode<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(Encoded))
    }

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items: Vec<T> = Vec::<T>::decode(deserializer)?;
        let len = items.len();
        items
            .try_into()
            .map_err(|_| de::Error::invalid_length(len, &ArrayLen(N)))
    }
}

impl<T: HostFloats> HostFloats for Option<T> {
    fn encode<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Some(value) => serializer.serialize_some(&Encoded(value)),
            None => serializer.serialize_none(),
        }
    }

    fn decode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<Decoded<T>>::deserialize(deserializer)?.map(|d| d.0))
    }
}

struct ArrayLen(usize);

impl de::Expected for ArrayLen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an array of {} elements", self.0)
    }
}

struct FloatVisitor;

impl Visitor<'_> for FloatVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or one of \"inf\", \"-inf\", \"nan\"")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        match v.to_ascii_lowercase().as_str() {
            "inf" | "+inf" | "infinity" | "+infinity" => Ok(f64::INFINITY),
            "-inf" | "-infinity" => Ok(f64::NEG_INFINITY),
            "nan" => Ok(f64::NAN),
            _ => Err(E::invalid_value(Unexpected::Str(v), &self)),
        }
    }
}
