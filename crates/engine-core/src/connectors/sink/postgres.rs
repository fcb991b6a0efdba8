use crate::{
    connectors::sink::{UpsertOutcome, UpsertSink},
    error::SinkError,
};
use async_trait::async_trait;
use connectors::sql::postgres::adapter::PgAdapter;
use model::records::Campground;
use tracing::{debug, info};

const CREATE_CAMPGROUNDS: &str = include_str!("sql/create_campgrounds.sql");
const UPSERT_CAMPGROUND: &str = include_str!("sql/upsert_campground.sql");

/// Writes campgrounds into the `campgrounds` table, one statement per record.
#[derive(Clone)]
pub struct PostgresSink {
    adapter: PgAdapter,
}

impl PostgresSink {
    pub fn new(adapter: PgAdapter) -> Self {
        Self { adapter }
    }

    /// Creates the `campgrounds` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), SinkError> {
        self.adapter.exec(CREATE_CAMPGROUNDS).await?;
        info!("Table campgrounds is ready");
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, SinkError> {
        let row = self
            .adapter
            .query_one("SELECT COUNT(*) FROM campgrounds", &[])
            .await?;
        row.try_get::<_, i64>(0)
            .map_err(|e| SinkError::Other(e.to_string()))
    }
}

#[async_trait]
impl UpsertSink<Campground> for PostgresSink {
    async fn upsert(&self, c: &Campground) -> Result<UpsertOutcome, SinkError> {
        if self.adapter.is_closed() {
            return Err(SinkError::Closed);
        }

        let row = self
            .adapter
            .query_one(
                UPSERT_CAMPGROUND,
                &[
                    &c.id,
                    &c.kind,
                    &c.link,
                    &c.name,
                    &c.latitude,
                    &c.longitude,
                    &c.region_name,
                    &c.administrative_area,
                    &c.nearest_city_name,
                    &c.accommodation_type_names,
                    &c.bookable,
                    &c.camper_types,
                    &c.operator,
                    &c.photo_url,
                    &c.photo_urls,
                    &c.photos_count,
                    &c.rating,
                    &c.reviews_count,
                    &c.slug,
                    &c.price_low,
                    &c.price_high,
                    &c.availability_updated_at,
                    &c.updated_at,
                ],
            )
            .await?;

        let inserted: bool = row
            .try_get("inserted")
            .map_err(|e| SinkError::Other(e.to_string()))?;
        debug!(id = %c.id, inserted, "Upserted campground");

        Ok(if inserted {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Updated
        })
    }
}
