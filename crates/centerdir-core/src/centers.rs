//! Center record types and the coordinate normalization applied at load time.
//!
//! Raw datasets carry coordinates as `["28.61", "77.20"]`, as bare numbers,
//! as `null`, or as garbage. Everything is folded into
//! `Option<Coordinates>` here so nothing downstream parses strings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// The minimal view of a record the nearest-center query needs.
pub trait Locatable {
    fn branch_code(&self) -> &str;
    fn coordinates(&self) -> Option<Coordinates>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, deserialize_with = "lenient_string")]
    pub line1: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub line2: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub line3: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pincode: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One physical branch location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CenterRecord {
    pub branch_code: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub region: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub state: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub district: String,
    #[serde(
        default,
        deserialize_with = "lenient_address",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<Address>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub mobile: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_coords")]
    pub coords: Option<Coordinates>,
    /// Fields this crate does not interpret, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Locatable for CenterRecord {
    fn branch_code(&self) -> &str {
        &self.branch_code
    }

    fn coordinates(&self) -> Option<Coordinates> {
        self.coords
    }
}

/// Normalize a raw coordinate value into `Coordinates`.
///
/// Accepts a two-element array whose elements are numbers or numeric
/// strings, or an object with `lat`/`lng` members. Anything else, including
/// components that parse to NaN or infinity, yields `None`.
#[must_use]
pub fn normalize_coords(value: &Value) -> Option<Coordinates> {
    let (lat, lng) = match value {
        Value::Array(items) if items.len() == 2 => (&items[0], &items[1]),
        Value::Object(map) => (map.get("lat")?, map.get("lng")?),
        _ => return None,
    };
    Some(Coordinates {
        lat: coordinate_component(lat)?,
        lng: coordinate_component(lng)?,
    })
}

fn coordinate_component(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    parsed.is_finite().then_some(parsed)
}

fn deserialize_coords<'de, D>(deserializer: D) -> Result<Option<Coordinates>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(normalize_coords))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Objects become an [`Address`]; a bare string is kept as `line1`.
fn lenient_address<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        Some(Value::String(line)) if !line.trim().is_empty() => Some(Address {
            line1: Some(line),
            ..Address::default()
        }),
        _ => None,
    })
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.unwrap_or_default())
}

/// Generate a URL-safe slug from a region, state, district or center name.
///
/// Lowercases, turns spaces and underscores into `-`, drops every other
/// non-ASCII-alphanumeric character and collapses repeated dashes.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                Some(c)
            } else if c == ' ' || c == '_' {
                Some('-')
            } else {
                None
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn normalize_coords_accepts_numeric_strings() {
        let coords = normalize_coords(&json!(["28.6139", " 77.2090 "])).unwrap();
        assert!((coords.lat - 28.6139).abs() < 1e-12);
        assert!((coords.lng - 77.2090).abs() < 1e-12);
    }

    #[test]
    fn normalize_coords_accepts_numbers_and_objects() {
        assert_eq!(
            normalize_coords(&json!([19.076, 72.8777])),
            Some(Coordinates::new(19.076, 72.8777))
        );
        assert_eq!(
            normalize_coords(&json!({"lat": 1.5, "lng": "2.5"})),
            Some(Coordinates::new(1.5, 2.5))
        );
    }

    #[test]
    fn normalize_coords_rejects_malformed_values() {
        for raw in [
            json!(null),
            json!([]),
            json!(["28.6"]),
            json!(["1", "2", "3"]),
            json!(["abc", "77.2"]),
            json!(["", ""]),
            json!(["NaN", "1"]),
            json!(["inf", "1"]),
            json!([true, 1]),
            json!("28.6,77.2"),
        ] {
            assert_eq!(normalize_coords(&raw), None, "expected None for {raw}");
        }
    }

    #[test]
    fn out_of_range_coordinates_are_kept() {
        assert_eq!(
            normalize_coords(&json!(["91.0", "200.0"])),
            Some(Coordinates::new(91.0, 200.0))
        );
    }

    #[test]
    fn center_record_deserializes_full_entry() {
        let raw = json!({
            "branch_code": "DL-001",
            "name": "Delhi Center",
            "region": "North",
            "state": "Delhi",
            "district": "New Delhi",
            "address": {"line1": "1 Ring Road", "city": "New Delhi", "pincode": 110001},
            "phone": "011-1234",
            "coords": ["28.6139", "77.2090"],
            "timings": "6am-8pm"
        });
        let center: CenterRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(center.branch_code, "DL-001");
        assert_eq!(center.district, "New Delhi");
        let address = center.address.as_ref().unwrap();
        assert_eq!(address.pincode.as_deref(), Some("110001"));
        assert_eq!(center.coordinates(), Some(Coordinates::new(28.6139, 77.2090)));
        assert_eq!(center.extra.get("timings"), Some(&json!("6am-8pm")));
    }

    #[test]
    fn center_record_tolerates_null_and_missing_fields() {
        let raw = json!({"branch_code": "X-1", "name": null, "coords": null});
        let center: CenterRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(center.name, "");
        assert_eq!(center.region, "");
        assert!(center.coords.is_none());
        assert!(center.address.is_none());
    }

    #[test]
    fn center_record_serialization_round_trips_normalized_coords() {
        let center = CenterRecord {
            branch_code: "MH-7".to_string(),
            coords: Some(Coordinates::new(19.076, 72.8777)),
            ..Default::default()
        };
        let json = serde_json::to_value(&center).unwrap();
        assert_eq!(json["coords"], json!({"lat": 19.076, "lng": 72.8777}));
        let back: CenterRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, center);
    }

    #[test]
    fn slugify_simple_name() {
        assert_eq!(slugify("Andhra Pradesh"), "andhra-pradesh");
    }

    #[test]
    fn slugify_drops_punctuation_and_collapses_dashes() {
        assert_eq!(slugify("Jammu & Kashmir"), "jammu-kashmir");
        assert_eq!(slugify("  St. Mary's -- Road_2 "), "st-marys-road-2");
    }

    #[test]
    fn slugify_strips_non_ascii() {
        // ñ is stripped without inserting a dash
        assert_eq!(slugify("Señor"), "seor");
    }
}
