pub mod error;
pub mod lifecycle_service;
pub mod matching_service;
pub mod notification_service;
pub mod realtime;
