use axum_test::TestServer;
use serde_json::json;
use sqlx::{MySql, Pool};

use eventradar_backend::config::Config;

// Allow dead_code for utilities used by other test files
#[allow(dead_code)]
pub struct TestContext {
    pub server: TestServer,
    pub db: Pool<MySql>,
    pub config: Config,
}

/// Configuration the integration suites run against. SMTP and FCM are left
/// empty so mail and push become logged no-ops.
#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        jwt_secret: "test-secret-key-for-testing-only".to_string(),
        server_url: "http://localhost:3000".to_string(),
        moderation_email: "moderation@example.com".to_string(),
        smtp_host: String::new(),
        smtp_port: 587,
        smtp_username: String::new(),
        smtp_password: String::new(),
        fcm_server_key: String::new(),
        reports_to_quarantine: 2,
        max_event_creations_per_day: 50,
        max_comment_creations_per_day: 1000,
        one_time_code_ttl_ms: 3_600_000,
    }
}

#[allow(dead_code)]
impl TestContext {
    /// Returns `None` when no test database is configured, so the suites
    /// degrade to no-ops instead of failing on machines without MySQL.
    pub async fn try_new() -> Option<Self> {
        Self::try_new_with(test_config()).await
    }

    pub async fn try_new_with(config: Config) -> Option<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("TEST_DATABASE_URL").ok()?;

        let db = sqlx::mysql::MySqlPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .expect("Failed to run migrations");

        let app = eventradar_backend::create_app(db.clone(), config.clone()).await;
        let server = TestServer::new(app).expect("Failed to create test server");

        let ctx = Self { server, db, config };
        ctx.cleanup().await;
        Some(ctx)
    }

    pub async fn cleanup(&self) {
        // Clean up test data; children first, FKs cascade the rest
        for table in [
            "sessions",
            "one_time_codes",
            "comment_reporters",
            "comments",
            "favorites",
            "event_viewers",
            "event_reporters",
            "event_categories",
            "events",
            "user_subscriptions",
            "users",
        ] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&self.db)
                .await
                .ok();
        }
    }

    /// Registers a fresh user and logs them in. Returns (user_id, bearer token).
    pub async fn register_and_login(&self, name: &str) -> (String, String) {
        let email = test_email();

        let response = self
            .server
            .post("/api/users")
            .json(&json!({
                "name": name,
                "email": email,
                "password": test_password(),
                "passwordConfirmation": test_password()
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        let user_id = body["id"].as_str().expect("user id").to_string();

        let response = self
            .server
            .post("/api/sessions")
            .json(&json!({
                "email": email,
                "password": test_password()
            }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let token = body["accessToken"].as_str().expect("access token").to_string();

        (user_id, token)
    }

    /// Creates an event through the API and returns its id.
    pub async fn create_event(&self, token: &str, name: &str, max_views: i32) -> String {
        let response = self
            .server
            .post("/api/events")
            .authorization_bearer(token)
            .json(&event_payload(name, max_views))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        body["id"].as_str().expect("event id").to_string()
    }
}

#[allow(dead_code)]
pub fn event_payload(name: &str, max_views: i32) -> serde_json::Value {
    let now = chrono::Utc::now().timestamp_millis();
    json!({
        "eventName": name,
        "description": "A test event",
        "organizerName": "Organizer",
        "category": ["music"],
        "startTimestamp": now,
        "endTimestamp": now + 86_400_000i64,
        "locationName": "Town Square",
        "location": {"type": "Point", "coordinates": [8.40, 49.00]},
        "image": "",
        "maxViews": max_views
    })
}

// Helper to generate unique test email
#[allow(dead_code)]
pub fn test_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4())
}

// Helper to generate a unique valid username
#[allow(dead_code)]
pub fn test_name(prefix: &str) -> String {
    format!("{}{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..8])
}

// Helper to generate test password
#[allow(dead_code)]
pub fn test_password() -> &'static str {
    "TestPassword123!"
}
