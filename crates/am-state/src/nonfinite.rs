//! Serde helpers for floats that may be NaN or infinite.
//!
//! JSON has no representation for non-finite numbers, so they are written
//! as `null` and read back as NaN. Use with `#[serde(with = "...")]`.

use serde::{Deserialize, Deserializer, Serializer};

pub mod seq {
    use super::*;

    pub fn serialize<S: Serializer>(data: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(data.iter().map(|v| v.is_finite().then_some(*v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let raw = Vec::<Option<f64>>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}

pub mod scalar {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "super::scalar")]
        norm: f64,
        #[serde(with = "super::seq")]
        data: Vec<f64>,
    }

    #[test]
    fn non_finite_values_survive_json() {
        let sample = Sample {
            norm: f64::INFINITY,
            data: vec![1.5, f64::NAN, -2.0],
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, r#"{"norm":null,"data":[1.5,null,-2.0]}"#);

        let back: Sample = serde_json::from_str(&json).unwrap();
        assert!(back.norm.is_nan());
        assert_eq!(back.data[0], 1.5);
        assert!(back.data[1].is_nan());
        assert_eq!(back.data[2], -2.0);
    }
}
