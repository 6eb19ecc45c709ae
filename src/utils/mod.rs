// Utility functions
pub mod dates;
pub mod error;
pub mod phone;

pub use error::*;
