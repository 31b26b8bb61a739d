use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// GeoJSON-style point, `coordinates = [longitude, latitude]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub point_type: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            point_type: "Point".to_string(),
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: String,
    pub user_id: String,
    pub event_name: String,
    pub description: String,
    pub organizer_name: String,
    pub location_name: String,
    pub image: String,
    pub longitude: f64,
    pub latitude: f64,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub creation_timestamp: i64,
    pub like_count: i32,
    pub reports: i32,
    pub viewer_count: i32,
    pub max_views: i32,
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub user: String,
    pub event_name: String,
    pub category: Vec<String>,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub organizer_name: String,
    pub description: String,
    pub location_name: String,
    pub location: GeoPoint,
    pub creation_timestamp: i64,
    pub image: String,
    pub like_count: i32,
    pub reports: i32,
    pub viewer_count: i32,
    pub max_views: i32,
    pub valid: bool,
}

impl Event {
    pub fn from_row(row: EventRow, category: Vec<String>) -> Self {
        Self {
            id: row.id,
            user: row.user_id,
            event_name: row.event_name,
            category,
            start_timestamp: row.start_timestamp,
            end_timestamp: row.end_timestamp,
            organizer_name: row.organizer_name,
            description: row.description,
            location_name: row.location_name,
            location: GeoPoint::new(row.longitude, row.latitude),
            creation_timestamp: row.creation_timestamp,
            image: row.image,
            like_count: row.like_count,
            reports: row.reports,
            viewer_count: row.viewer_count,
            max_views: row.max_views,
            valid: row.valid,
        }
    }
}

/// View gate: whether a capped-visibility event is still servable to the
/// requester. The owner and anyone who already consumed a view always pass.
pub fn passes_view_gate(
    viewer_count: i32,
    max_views: i32,
    is_owner: bool,
    is_viewer: bool,
) -> bool {
    max_views == -1 || is_owner || is_viewer || viewer_count <= max_views
}
