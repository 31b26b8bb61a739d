pub mod comments;
pub mod events;
pub mod moderation;
pub mod users;
