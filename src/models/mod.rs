pub mod checklist;
pub mod duty;
pub mod user;

pub use checklist::*;
pub use duty::*;
pub use user::*;
