use std::env;

/// Environment configuration
/// Loads and validates environment variables
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Public base URL used to build moderation and password-reset links.
    pub server_url: String,
    /// Operator mailbox that receives all moderation mails.
    pub moderation_email: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub fcm_server_key: String,
    /// Report count at which a resource is quarantined for human review.
    pub reports_to_quarantine: i32,
    pub max_event_creations_per_day: i32,
    pub max_comment_creations_per_day: i32,
    /// One-time code lifetime in milliseconds.
    pub one_time_code_ttl_ms: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;

        let server_url =
            env::var("SERVER_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let moderation_email =
            env::var("MODERATION_EMAIL").unwrap_or_else(|_| "".to_string());

        let smtp_host = env::var("SMTP_HOST").unwrap_or_else(|_| "".to_string());
        let smtp_port = parse_var("SMTP_PORT", 587u16)?;
        let smtp_username = env::var("SMTP_USERNAME").unwrap_or_else(|_| "".to_string());
        let smtp_password = env::var("SMTP_PASSWORD").unwrap_or_else(|_| "".to_string());

        let fcm_server_key = env::var("FCM_SERVER_KEY").unwrap_or_else(|_| "".to_string());

        let reports_to_quarantine = parse_var("REPORTS_TO_QUARANTINE", 2i32)?;
        let max_event_creations_per_day = parse_var("MAX_EVENT_CREATIONS_PER_DAY", 50i32)?;
        let max_comment_creations_per_day = parse_var("MAX_COMMENT_CREATIONS_PER_DAY", 1000i32)?;
        let one_time_code_ttl_ms = parse_var("ONE_TIME_CODE_TTL_MS", 3_600_000i64)?;

        Ok(Self {
            database_url,
            jwt_secret,
            server_url,
            moderation_email,
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            fcm_server_key,
            reports_to_quarantine,
            max_event_creations_per_day,
            max_comment_creations_per_day,
            one_time_code_ttl_ms,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| format!("{} has an invalid value", name)),
        Err(_) => Ok(default),
    }
}
