use chrono::Utc;
use uuid::Uuid;

use super::model::{passes_view_gate, Event, EventRow};
use super::schema::{CreateEventRequest, UpdateEventRequest};
use crate::config::DbPool;
use crate::services::error::{ApiError, ApiResult};
use crate::services::quota::utc_midnight_ms;

pub struct EventCrud {
    pool: DbPool,
}

/// Outcome of a report, handed to the quarantine pipeline by the controller.
pub struct ReportOutcome {
    pub event: Event,
    pub reports: i32,
}

impl EventCrud {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner_id: &str, input: &CreateEventRequest) -> ApiResult<Event> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp_millis();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO events
              (id, user_id, event_name, description, organizer_name, location_name,
               image, longitude, latitude, start_timestamp, end_timestamp,
               creation_timestamp, max_views)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(owner_id)
        .bind(&input.event_name)
        .bind(&input.description)
        .bind(&input.organizer_name)
        .bind(input.location_name.as_deref().unwrap_or(""))
        .bind(&input.image)
        .bind(input.location.longitude())
        .bind(input.location.latitude())
        .bind(input.start_timestamp)
        .bind(input.end_timestamp)
        .bind(now)
        .bind(input.max_views)
        .execute(&mut *tx)
        .await?;

        for category in &input.category {
            sqlx::query("INSERT IGNORE INTO event_categories (event_id, category) VALUES (?, ?)")
                .bind(&id)
                .bind(category)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.find_by_id(&id).await?.ok_or(ApiError::NotFound)
    }

    pub async fn find_by_id(&self, id: &str) -> ApiResult<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let categories = self.categories_of(&row.id).await?;
                Ok(Some(Event::from_row(row, categories)))
            }
            None => Ok(None),
        }
    }

    async fn categories_of(&self, event_id: &str) -> ApiResult<Vec<String>> {
        let categories =
            sqlx::query_scalar("SELECT category FROM event_categories WHERE event_id = ?")
                .bind(event_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    async fn attach_categories(&self, rows: Vec<EventRow>) -> ApiResult<Vec<Event>> {
        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let categories = self.categories_of(&row.id).await?;
            events.push(Event::from_row(row, categories));
        }
        Ok(events)
    }

    pub async fn update(
        &self,
        event_id: &str,
        input: &UpdateEventRequest,
    ) -> ApiResult<Event> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE events SET
              event_name = ?, description = ?, organizer_name = ?, location_name = ?,
              image = ?, longitude = ?, latitude = ?, start_timestamp = ?,
              end_timestamp = ?, max_views = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.event_name)
        .bind(&input.description)
        .bind(&input.organizer_name)
        .bind(input.location_name.as_deref().unwrap_or(""))
        .bind(&input.image)
        .bind(input.location.longitude())
        .bind(input.location.latitude())
        .bind(input.start_timestamp)
        .bind(input.end_timestamp)
        .bind(input.max_views)
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM event_categories WHERE event_id = ?")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        for category in &input.category {
            sqlx::query("INSERT IGNORE INTO event_categories (event_id, category) VALUES (?, ?)")
                .bind(event_id)
                .bind(category)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.find_by_id(event_id).await?.ok_or(ApiError::NotFound)
    }

    // =========================================================================
    // DISCOVERY
    // =========================================================================

    /// Geo-radius discovery. Filters: newer than the sync cursor, not yet
    /// ended today, not quarantined, not reported by the requester, and the
    /// view gate. Ascending creation time, capped at 10.
    pub async fn discover(
        &self,
        longitude: f64,
        latitude: f64,
        radius_meters: f64,
        since_creation_timestamp: i64,
        requester_id: &str,
        reports_to_quarantine: i32,
    ) -> ApiResult<Vec<Event>> {
        let end_time_limit = utc_midnight_ms(Utc::now().timestamp_millis());

        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT e.* FROM events e
            WHERE e.valid = TRUE
              AND ST_Distance_Sphere(POINT(e.longitude, e.latitude), POINT(?, ?)) <= ?
              AND e.creation_timestamp > ?
              AND e.end_timestamp > ?
              AND e.reports <= ?
              AND NOT EXISTS (
                    SELECT 1 FROM event_reporters r
                    WHERE r.event_id = e.id AND r.user_id = ?)
              AND (e.max_views = -1
                   OR e.viewer_count <= e.max_views
                   OR e.user_id = ?
                   OR EXISTS (
                        SELECT 1 FROM event_viewers v
                        WHERE v.event_id = e.id AND v.user_id = ?))
            ORDER BY e.creation_timestamp ASC
            LIMIT 10
            "#,
        )
        .bind(longitude)
        .bind(latitude)
        .bind(radius_meters)
        .bind(since_creation_timestamp)
        .bind(end_time_limit)
        .bind(reports_to_quarantine)
        .bind(requester_id)
        .bind(requester_id)
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;

        self.attach_categories(rows).await
    }

    /// One-time view consumption. The membership insert is the guard: the
    /// composite primary key on event_viewers makes it race-safe, and the
    /// counter only moves when the insert actually landed.
    pub async fn mark_viewed(&self, event_id: &str, requester_id: &str) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT IGNORE INTO event_viewers (event_id, user_id)
            SELECT e.id, ? FROM events e
            WHERE e.id = ? AND e.max_views <> -1 AND e.user_id <> ?
            "#,
        )
        .bind(requester_id)
        .bind(event_id)
        .bind(requester_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted > 0 {
            sqlx::query("UPDATE events SET viewer_count = viewer_count + 1 WHERE id = ?")
                .bind(event_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Single-event fetch behind the view gate. A closed gate is an
    /// `Exhausted` condition, distinct from the event not existing.
    pub async fn get_gated(&self, event_id: &str, requester_id: &str) -> ApiResult<Event> {
        let event = self
            .find_by_id(event_id)
            .await?
            .filter(|e| e.valid)
            .ok_or(ApiError::NotFound)?;

        let is_viewer = self.is_viewer(event_id, requester_id).await?;
        let is_owner = event.user == requester_id;

        if !passes_view_gate(event.viewer_count, event.max_views, is_owner, is_viewer) {
            return Err(ApiError::Exhausted);
        }

        if event.max_views != -1 && !is_owner && !is_viewer {
            self.mark_viewed(event_id, requester_id).await?;
        }

        Ok(event)
    }

    async fn is_viewer(&self, event_id: &str, user_id: &str) -> ApiResult<bool> {
        let row: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM event_viewers WHERE event_id = ? AND user_id = ?")
                .bind(event_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    // =========================================================================
    // LISTINGS (timestamp-gap pagination)
    // =========================================================================

    /// Events owned by the user whose creation time falls strictly outside
    /// [old, new], newest first, capped at 5.
    pub async fn my_events(
        &self,
        user_id: &str,
        old_events_timestamp: i64,
        new_events_timestamp: i64,
    ) -> ApiResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT * FROM events
            WHERE user_id = ?
              AND (creation_timestamp < ? OR creation_timestamp > ?)
            ORDER BY creation_timestamp DESC
            LIMIT 5
            "#,
        )
        .bind(user_id)
        .bind(old_events_timestamp)
        .bind(new_events_timestamp)
        .fetch_all(&self.pool)
        .await?;

        self.attach_categories(rows).await
    }

    pub async fn favorite_events(
        &self,
        user_id: &str,
        old_events_timestamp: i64,
        new_events_timestamp: i64,
    ) -> ApiResult<Vec<Event>> {
        let now = Utc::now().timestamp_millis();
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT e.* FROM events e
            JOIN favorites f ON f.event_id = e.id
            WHERE f.user_id = ?
              AND (e.creation_timestamp < ? OR e.creation_timestamp > ?)
              AND e.end_timestamp > ?
            ORDER BY e.creation_timestamp DESC
            LIMIT 5
            "#,
        )
        .bind(user_id)
        .bind(old_events_timestamp)
        .bind(new_events_timestamp)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        self.attach_categories(rows).await
    }

    // =========================================================================
    // REPORTS
    // =========================================================================

    /// Register a report. One report per user per event; reporting also
    /// withdraws the reporter's favorite, since favoriting and reporting are
    /// mutually exclusive. Returns the post-increment report count.
    pub async fn report(&self, event_id: &str, reporter_id: &str) -> ApiResult<ReportOutcome> {
        let event = self.find_by_id(event_id).await?.ok_or(ApiError::NotFound)?;

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT IGNORE INTO event_reporters (event_id, user_id) VALUES (?, ?)",
        )
        .bind(event_id)
        .bind(reporter_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            return Err(ApiError::conflict("Event has already been reported"));
        }

        let unfavorited = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND event_id = ?")
            .bind(reporter_id)
            .bind(event_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if unfavorited > 0 {
            sqlx::query(
                "UPDATE events SET reports = reports + 1, like_count = like_count - 1 WHERE id = ?",
            )
            .bind(event_id)
            .execute(&mut *tx)
            .await?;
        } else {
            sqlx::query("UPDATE events SET reports = reports + 1 WHERE id = ?")
                .bind(event_id)
                .execute(&mut *tx)
                .await?;
        }

        let reports: i32 = sqlx::query_scalar("SELECT reports FROM events WHERE id = ?")
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ReportOutcome { event, reports })
    }

    /// Moderation approval: clear reports and reporters, and re-stamp the
    /// creation timestamp so the event re-enters discovery windows as if
    /// newly created. Viewer history survives re-approval.
    pub async fn approve(&self, event_id: &str) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE events SET reports = 0, creation_timestamp = ? WHERE id = ?",
        )
        .bind(Utc::now().timestamp_millis())
        .bind(event_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(ApiError::NotFound);
        }

        sqlx::query("DELETE FROM event_reporters WHERE event_id = ?")
            .bind(event_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
