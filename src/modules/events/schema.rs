use serde::Deserialize;
use validator::Validate;

use super::model::GeoPoint;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(min = 1, message = "eventName is required"))]
    pub event_name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "organizerName is required"))]
    pub organizer_name: String,
    #[serde(default)]
    pub category: Vec<String>,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    #[serde(default)]
    pub location_name: Option<String>,
    pub location: GeoPoint,
    pub image: String,
    pub max_views: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[validate(length(min = 1, message = "eventName is required"))]
    pub event_name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "organizerName is required"))]
    pub organizer_name: String,
    #[serde(default)]
    pub category: Vec<String>,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    #[serde(default)]
    pub location_name: Option<String>,
    pub location: GeoPoint,
    pub image: String,
    pub max_views: i32,
}

#[derive(Debug, Deserialize)]
pub struct ExplorePath {
    pub longitude: f64,
    pub latitude: f64,
    pub radius: f64,
    pub creation_timestamp: i64,
}

#[derive(Debug, Deserialize)]
pub struct TimestampWindowPath {
    pub old_events_timestamp: i64,
    pub new_events_timestamp: i64,
}
