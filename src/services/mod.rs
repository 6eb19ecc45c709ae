pub mod access_service;
pub mod auth_service;
pub mod checklist_service;
pub mod duty_service;
pub mod notification_service;
pub mod user_service;
