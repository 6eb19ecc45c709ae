pub mod checklist;
pub mod duties;
pub mod health;
pub mod metrics;
pub mod roster;
pub mod swagger;
pub mod users;
