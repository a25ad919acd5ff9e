//! Geo coordinates in one of three encodings

use serde_json::Value;

use crate::codec::accessors::{Fields, Obj};
use crate::domain::types::enums::GeoCoordinatesFormat;
use crate::support::errors::CodecError;

const CONTEXT: &str = "GeoCoordinates";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinates {
    pub latitude: f64,
    pub longitude: f64,
    /// Encoding used on the wire.
    pub format: GeoCoordinatesFormat,
}

impl GeoCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            format: GeoCoordinatesFormat::Google,
        }
    }

    pub fn with_format(mut self, format: GeoCoordinatesFormat) -> Self {
        self.format = format;
        self
    }

    fn checked(latitude: f64, longitude: f64, format: GeoCoordinatesFormat) -> Result<Self, CodecError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CodecError::invalid(CONTEXT, "Latitude", format!("{} out of range", latitude)));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CodecError::invalid(CONTEXT, "Longitude", format!("{} out of range", longitude)));
        }
        Ok(Self {
            latitude,
            longitude,
            format,
        })
    }

    pub(crate) fn to_value(&self) -> Value {
        let inner = match self.format {
            GeoCoordinatesFormat::Google => Obj::new().text(
                "Coordinates",
                format!("{} {}", self.latitude, self.longitude),
            ),
            GeoCoordinatesFormat::DecimalDegree => Obj::new()
                .text("Longitude", self.longitude)
                .text("Latitude", self.latitude),
            GeoCoordinatesFormat::DegreeMinuteSeconds => Obj::new()
                .text("Longitude", to_dms(self.longitude))
                .text("Latitude", to_dms(self.latitude)),
        };
        Obj::new()
            .value(self.format.as_wire(), inner.build())
            .build()
    }

    /// Google, then DecimalDegree, then DegreeMinuteSeconds; exactly one.
    pub(crate) fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        let present: Vec<GeoCoordinatesFormat> = GeoCoordinatesFormat::ALL
            .iter()
            .copied()
            .filter(|format| f.has(format.as_wire()))
            .collect();

        match present.as_slice() {
            [GeoCoordinatesFormat::Google] => {
                let coordinates = f.required_object("Google")?.required_str("Coordinates")?;
                let mut parts = coordinates.split_whitespace();
                let (lat, lon) = match (parts.next(), parts.next(), parts.next()) {
                    (Some(lat), Some(lon), None) => (lat, lon),
                    _ => {
                        return Err(CodecError::invalid(
                            CONTEXT,
                            "Coordinates",
                            "expected '<latitude> <longitude>'",
                        ))
                    }
                };
                let lat = lat
                    .parse::<f64>()
                    .map_err(|e| CodecError::invalid(CONTEXT, "Coordinates", e))?;
                let lon = lon
                    .parse::<f64>()
                    .map_err(|e| CodecError::invalid(CONTEXT, "Coordinates", e))?;
                Self::checked(lat, lon, GeoCoordinatesFormat::Google)
            }
            [GeoCoordinatesFormat::DecimalDegree] => {
                let inner = f.required_object("DecimalDegree")?;
                Self::checked(
                    inner.required("Latitude")?,
                    inner.required("Longitude")?,
                    GeoCoordinatesFormat::DecimalDegree,
                )
            }
            [GeoCoordinatesFormat::DegreeMinuteSeconds] => {
                let inner = f.required_object("DegreeMinuteSeconds")?;
                let lat = from_dms(&inner.required_str("Latitude")?)
                    .ok_or_else(|| CodecError::invalid(CONTEXT, "Latitude", "not a D°M'S'' value"))?;
                let lon = from_dms(&inner.required_str("Longitude")?)
                    .ok_or_else(|| CodecError::invalid(CONTEXT, "Longitude", "not a D°M'S'' value"))?;
                Self::checked(lat, lon, GeoCoordinatesFormat::DegreeMinuteSeconds)
            }
            [] => Err(CodecError::Choice {
                context: CONTEXT,
                reason: "no coordinate encoding present".into(),
            }),
            _ => Err(CodecError::Choice {
                context: CONTEXT,
                reason: "more than one coordinate encoding present".into(),
            }),
        }
    }
}

/// `-9°21'39.319''`
fn to_dms(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    let degrees = abs.trunc();
    let minutes_full = (abs - degrees) * 60.0;
    let minutes = minutes_full.trunc();
    let seconds = (minutes_full - minutes) * 60.0;
    format!("{}{}°{}'{:.3}''", sign, degrees as u32, minutes as u32, seconds)
}

fn from_dms(s: &str) -> Option<f64> {
    let s = s.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (degrees, rest) = s.split_once('°')?;
    let (minutes, rest) = rest.split_once('\'')?;
    let seconds = rest.trim().trim_end_matches('\'').trim_end_matches('"');

    let degrees: f64 = degrees.trim().parse().ok()?;
    let minutes: f64 = minutes.trim().parse().ok()?;
    let seconds: f64 = seconds.trim().parse().ok()?;
    if minutes >= 60.0 || seconds >= 60.0 {
        return None;
    }

    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    let value = (value * 1_000_000.0).round() / 1_000_000.0;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> Result<GeoCoordinates, CodecError> {
        GeoCoordinates::from_fields(Fields::new("GeoCoordinates", &v).unwrap())
    }

    #[test]
    fn google_and_decimal_round_trip() {
        let geo = parse(json!({"Google": {"Coordinates": "47.662 9.360922"}})).unwrap();
        assert_eq!(geo.latitude, 47.662);
        assert_eq!(parse(geo.to_value()).unwrap(), geo);

        let decimal = geo.with_format(GeoCoordinatesFormat::DecimalDegree);
        assert_eq!(parse(decimal.to_value()).unwrap(), decimal);
    }

    #[test]
    fn degree_minute_seconds() {
        let geo = parse(json!({"DegreeMinuteSeconds": {
            "Latitude": "47°39'43.200''",
            "Longitude": "-9°21'39.319''"
        }}))
        .unwrap();
        assert!((geo.latitude - 47.662).abs() < 1e-6);
        assert!((geo.longitude + 9.360922).abs() < 1e-6);
    }

    #[test]
    fn exactly_one_encoding() {
        assert!(parse(json!({})).is_err());
        assert!(parse(json!({
            "Google": {"Coordinates": "1 2"},
            "DecimalDegree": {"Latitude": "1", "Longitude": "2"}
        }))
        .is_err());
        assert!(parse(json!({"Google": {"Coordinates": "91 2"}})).is_err());
    }
}
