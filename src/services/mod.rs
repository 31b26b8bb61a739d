pub mod auth;
pub mod error;
pub mod hashing;
pub mod html;
pub mod jwt;
pub mod mailer;
pub mod profanity;
pub mod push;
pub mod quota;
pub mod rate_limit;
pub mod security;
pub mod transactions;
