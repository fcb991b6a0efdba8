use crate::records::DomainRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A campground listing as stored in the `campgrounds` table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Campground {
    pub id: String,
    pub kind: String,
    pub link: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub region_name: String,
    pub administrative_area: Option<String>,
    pub nearest_city_name: Option<String>,
    pub accommodation_type_names: Vec<String>,
    pub bookable: bool,
    pub camper_types: Vec<String>,
    pub operator: Option<String>,
    pub photo_url: Option<String>,
    pub photo_urls: Vec<String>,
    pub photos_count: i32,
    pub rating: Option<f64>,
    pub reviews_count: i32,
    pub slug: Option<String>,
    pub price_low: Option<f64>,
    pub price_high: Option<f64>,
    pub availability_updated_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DomainRecord for Campground {
    fn identity(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }
}
