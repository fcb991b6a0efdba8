use crate::normalize::RecordNormalizer;
use chrono::{DateTime, NaiveDateTime, Utc};
use model::{
    errors::ValidationError,
    records::{Campground, RawItem},
};
use serde_json::{Map, Value};

const DEFAULT_KIND: &str = "campground";
const DEFAULT_LINK: &str = "https://thedyrt.com";
const DEFAULT_REGION: &str = "Unknown";

/// Maps search API items onto [`Campground`].
#[derive(Debug, Clone, Default)]
pub struct CampgroundNormalizer;

impl CampgroundNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl RecordNormalizer<Campground> for CampgroundNormalizer {
    fn normalize(&self, raw: &RawItem) -> Result<Campground, ValidationError> {
        let obj = match raw {
            RawItem::Json(Value::Object(obj)) => obj,
            RawItem::Json(_) => {
                return Err(ValidationError::UnsupportedPayload(
                    "item is not a JSON object".to_string(),
                ));
            }
            RawItem::Bytes(_) => {
                return Err(ValidationError::UnsupportedPayload(
                    "binary payload".to_string(),
                ));
            }
        };

        let id = required_id(obj)?;
        let name = opt_string(obj, "name")
            .ok_or_else(|| ValidationError::MissingField("name".to_string()))?;

        let latitude = coordinate(obj, "latitude", 90.0)?;
        let longitude = coordinate(obj, "longitude", 180.0)?;

        let rating = opt_f64(obj, "rating")?;
        if let Some(r) = rating {
            if !(0.0..=5.0).contains(&r) {
                return Err(ValidationError::invalid("rating", format!("{r} is outside 0..=5")));
            }
        }

        let price_low = opt_f64(obj, "price_low")?;
        let price_high = opt_f64(obj, "price_high")?;
        if let (Some(low), Some(high)) = (price_low, price_high) {
            if low > high {
                return Err(ValidationError::invalid(
                    "price_low",
                    format!("{low} is greater than price_high {high}"),
                ));
            }
        }

        Ok(Campground {
            id,
            kind: opt_string(obj, "type").unwrap_or_else(|| DEFAULT_KIND.to_string()),
            link: opt_string(obj, "url").unwrap_or_else(|| DEFAULT_LINK.to_string()),
            name,
            latitude,
            longitude,
            region_name: opt_string(obj, "state").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            administrative_area: opt_string(obj, "administrative_area"),
            nearest_city_name: opt_string(obj, "nearest_city"),
            accommodation_type_names: string_list(obj, "accommodation_types")?,
            bookable: obj.get("bookable").and_then(Value::as_bool).unwrap_or(false),
            camper_types: string_list(obj, "camper_types")?,
            operator: opt_string(obj, "operator"),
            photo_url: opt_string(obj, "primary_photo_url"),
            photo_urls: string_list(obj, "photo_urls")?,
            photos_count: count(obj, "photos_count")?,
            rating,
            reviews_count: count(obj, "reviews_count")?,
            slug: opt_string(obj, "slug"),
            price_low,
            price_high,
            availability_updated_at: timestamp(obj, "availability_updated_at")?,
            updated_at: None,
        })
    }
}

fn required_id(obj: &Map<String, Value>) -> Result<String, ValidationError> {
    match obj.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            Err(ValidationError::MissingField("id".to_string()))
        }
        Some(other) => Err(ValidationError::invalid("id", format!("unexpected value {other}"))),
    }
}

/// Non-empty trimmed string, or `None`.
fn opt_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts JSON numbers and numeric strings.
fn opt_f64(obj: &Map<String, Value>, key: &str) -> Result<Option<f64>, ValidationError> {
    let value = match obj.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match value {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(ValidationError::invalid(key, "not a number")),
    }
}

fn coordinate(obj: &Map<String, Value>, key: &str, limit: f64) -> Result<f64, ValidationError> {
    let value = opt_f64(obj, key)?.ok_or_else(|| ValidationError::MissingField(key.to_string()))?;
    if value.abs() > limit {
        return Err(ValidationError::invalid(
            key,
            format!("{value} is outside -{limit}..={limit}"),
        ));
    }
    Ok(value)
}

fn count(obj: &Map<String, Value>, key: &str) -> Result<i32, ValidationError> {
    let Some(value) = opt_f64(obj, key)? else {
        return Ok(0);
    };
    if value < 0.0 {
        return Err(ValidationError::invalid(key, format!("{value} is negative")));
    }
    if value.fract() != 0.0 || value > i32::MAX as f64 {
        return Err(ValidationError::invalid(key, format!("{value} is not a count")));
    }
    Ok(value as i32)
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Result<Vec<String>, ValidationError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            })
            .collect()),
        Some(_) => Err(ValidationError::invalid(key, "expected a list of strings")),
    }
}

/// RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS[.f]` taken as UTC.
fn timestamp(
    obj: &Map<String, Value>,
    key: &str,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let Some(raw) = opt_string(obj, key) else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Some(naive.and_utc()))
        .map_err(|_| ValidationError::invalid(key, format!("unrecognised timestamp {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(value: Value) -> Result<Campground, ValidationError> {
        CampgroundNormalizer::new().normalize(&RawItem::Json(value))
    }

    #[test]
    fn maps_full_item() {
        let camp = normalize(json!({
            "id": "cg-1",
            "name": "  Pine Flat ",
            "latitude": "36.5",
            "longitude": -118.25,
            "state": "CA",
            "nearest_city": "Fresno",
            "accommodation_types": ["tent", "rv", ""],
            "bookable": true,
            "camper_types": ["tent"],
            "primary_photo_url": "https://img/1.jpg",
            "photo_urls": ["https://img/1.jpg", "https://img/2.jpg"],
            "photos_count": 2,
            "rating": 4.5,
            "reviews_count": 12,
            "price_low": 20,
            "price_high": 35.5,
            "availability_updated_at": "2024-05-01T10:00:00Z",
            "url": "https://thedyrt.com/camping/pine-flat"
        }))
        .unwrap();

        assert_eq!(camp.id, "cg-1");
        assert_eq!(camp.name, "Pine Flat");
        assert_eq!(camp.kind, "campground");
        assert_eq!(camp.latitude, 36.5);
        assert_eq!(camp.region_name, "CA");
        assert_eq!(camp.nearest_city_name.as_deref(), Some("Fresno"));
        assert_eq!(camp.accommodation_type_names, vec!["tent", "rv"]);
        assert!(camp.bookable);
        assert_eq!(camp.photo_urls.len(), 2);
        assert_eq!(camp.price_low, Some(20.0));
        assert_eq!(camp.link, "https://thedyrt.com/camping/pine-flat");
        assert!(camp.availability_updated_at.is_some());
        assert!(camp.updated_at.is_none());
    }

    #[test]
    fn fills_defaults_for_sparse_item() {
        let camp = normalize(json!({"id": 77, "name": "Lake", "latitude": 40, "longitude": -100})).unwrap();
        assert_eq!(camp.id, "77");
        assert_eq!(camp.region_name, "Unknown");
        assert_eq!(camp.link, "https://thedyrt.com");
        assert_eq!(camp.photos_count, 0);
        assert!(camp.camper_types.is_empty());
        assert_eq!(camp.rating, None);
    }

    #[test]
    fn rejects_missing_identity_and_name() {
        let err = normalize(json!({"name": "x", "latitude": 1, "longitude": 1})).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("id".into()));

        let err = normalize(json!({"id": " ", "name": "x", "latitude": 1, "longitude": 1})).unwrap_err();
        assert_eq!(err.kind(), "missing_field");

        let err = normalize(json!({"id": "a", "latitude": 1, "longitude": 1})).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("name".into()));
    }

    #[test]
    fn rejects_bad_coordinates() {
        assert!(normalize(json!({"id": "a", "name": "x", "latitude": "north", "longitude": 1})).is_err());
        assert!(normalize(json!({"id": "a", "name": "x", "latitude": 91, "longitude": 1})).is_err());
        assert!(normalize(json!({"id": "a", "name": "x", "latitude": 10})).is_err());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let base = |extra: Value| {
            let mut item = json!({"id": "a", "name": "x", "latitude": 1, "longitude": 1});
            if let (Value::Object(item), Value::Object(extra)) = (&mut item, extra) {
                item.extend(extra);
            }
            normalize(item)
        };

        assert!(base(json!({"rating": 5.5})).is_err());
        assert!(base(json!({"reviews_count": -1})).is_err());
        assert!(base(json!({"price_low": 50, "price_high": 10})).is_err());
        assert!(base(json!({"availability_updated_at": "yesterday"})).is_err());
        assert!(base(json!({"rating": 5, "price_low": 10, "price_high": 10})).is_ok());
    }

    #[test]
    fn rejects_non_object_payloads() {
        assert_eq!(normalize(json!([1, 2])).unwrap_err().kind(), "unsupported_payload");
        let err = CampgroundNormalizer::new()
            .normalize(&RawItem::Bytes(b"<html>".to_vec()))
            .unwrap_err();
        assert_eq!(err.kind(), "unsupported_payload");
    }
}
