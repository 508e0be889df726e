pub mod categories;
pub mod jobs;
pub mod notifications;
pub mod ratings;
pub mod users;
