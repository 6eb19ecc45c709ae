use serde::{Deserialize, Serialize};

use super::DutyType;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct User {
    pub netid: String, // PRIMARY IDENTIFIER - university-issued id
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub is_admin: bool,
    /// Duty types this user may assign and check off
    #[serde(default)]
    pub assigns: Vec<DutyType>,
}

impl User {
    pub fn first_name(&self) -> &str {
        first_name(&self.name)
    }

    pub fn is_assigner(&self) -> bool {
        self.is_admin || !self.assigns.is_empty()
    }

    pub fn can_assign(&self, duty_type: DutyType) -> bool {
        self.is_admin || self.assigns.contains(&duty_type)
    }
}

pub fn first_name(full_name: &str) -> &str {
    full_name.split_whitespace().next().unwrap_or("")
}

/// netids end up inside document field paths (`credits.<netid>`)
pub fn is_valid_netid(netid: &str) -> bool {
    !netid.is_empty()
        && netid.len() <= 32
        && netid.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpsertUserRequest {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub assigns: Vec<DutyType>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserCreditsResponse {
    pub netid: String,
    pub total_credits: f64,
    pub duties_counted: usize,
}
