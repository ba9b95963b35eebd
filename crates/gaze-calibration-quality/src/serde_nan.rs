//! Serde adapter for quality figures that may be NaN.
//!
//! JSON has no NaN literal, so NaN is written as `null` and `null` is read
//! back as NaN. Use with `#[serde(with = "serde_nan")]`.

use gaze_calibration_core::Real;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &Real, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_nan() {
        serializer.serialize_none()
    } else {
        serializer.serialize_some(value)
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Real, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Real>::deserialize(deserializer)?.unwrap_or(Real::NAN))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Wrapped {
        #[serde(with = "super")]
        v: f64,
    }

    #[test]
    fn nan_maps_to_null() {
        let json = serde_json::to_string(&Wrapped { v: f64::NAN }).unwrap();
        assert_eq!(json, r#"{"v":null}"#);
        let back: Wrapped = serde_json::from_str(&json).unwrap();
        assert!(back.v.is_nan());
    }

    #[test]
    fn finite_values_pass_through() {
        let json = serde_json::to_string(&Wrapped { v: 0.25 }).unwrap();
        assert_eq!(json, r#"{"v":0.25}"#);
        let back: Wrapped = serde_json::from_str(&json).unwrap();
        assert_eq!(back.v, 0.25);
    }
}
