use serde::{Deserialize, Serialize};

use super::{DutyType, User};

/// Estado dos créditos de um residente numa duty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CreditStatus {
    Complete,
    Missing,
    Custom,
}

impl CreditStatus {
    pub fn from_credits(credits: f64) -> Self {
        if credits == 1.0 {
            CreditStatus::Complete
        } else if credits == 0.0 {
            CreditStatus::Missing
        } else {
            CreditStatus::Custom
        }
    }
}

/// Ação de check-off vinda do checklist
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum CreditAction {
    /// 1 credit
    Complete,
    /// 0 credits
    Missing,
    /// Free-form amount typed by the checker
    Custom { value: String },
}

#[derive(Debug, Deserialize)]
pub struct ChecklistQuery {
    #[serde(rename = "type")]
    pub duty_type: Option<String>,
    #[serde(default)]
    pub show_checked: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChecklistAssignee {
    pub netid: String,
    pub name: String,
    pub first_name: String,
    pub credits: f64,
    pub status: CreditStatus,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChecklistDuty {
    pub id: String,
    pub name: String,
    pub date_label: String,
    pub checked: bool,
    pub assignees: Vec<ChecklistAssignee>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChecklistResponse {
    pub success: bool,
    #[serde(rename = "type")]
    pub duty_type: DutyType,
    pub show_checked: bool,
    pub duties: Vec<ChecklistDuty>,
    pub hidden_count: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CreditUpdateResponse {
    pub success: bool,
    pub duty_id: String,
    pub netid: String,
    pub credits: f64,
    pub status: CreditStatus,
    /// false when the action matched the stored value and nothing was written
    pub written: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RosterDutyItem {
    pub id: String,
    pub name: String,
    pub date: chrono::DateTime<chrono::Utc>,
    pub date_label: String,
}

/// Duties de um usuário agrupadas por tipo; todas as chaves sempre presentes
#[derive(Debug, Default, Serialize, utoipa::ToSchema)]
pub struct DutiesByType {
    pub waiter: Vec<RosterDutyItem>,
    pub cleaning: Vec<RosterDutyItem>,
    pub social: Vec<RosterDutyItem>,
}

impl DutiesByType {
    pub fn bucket_mut(&mut self, duty_type: DutyType) -> &mut Vec<RosterDutyItem> {
        match duty_type {
            DutyType::Waiter => &mut self.waiter,
            DutyType::Cleaning => &mut self.cleaning,
            DutyType::Social => &mut self.social,
        }
    }

    pub fn total(&self) -> usize {
        self.waiter.len() + self.cleaning.len() + self.social.len()
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RosterResponse {
    pub success: bool,
    pub error: bool,
    pub user: User,
    pub duties: DutiesByType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_status() {
        assert_eq!(CreditStatus::from_credits(1.0), CreditStatus::Complete);
        assert_eq!(CreditStatus::from_credits(0.0), CreditStatus::Missing);
        assert_eq!(CreditStatus::from_credits(0.5), CreditStatus::Custom);
        assert_eq!(CreditStatus::from_credits(2.0), CreditStatus::Custom);
    }

    #[test]
    fn test_credit_action_json() {
        let a: CreditAction = serde_json::from_str(r#"{"action":"complete"}"#).unwrap();
        assert!(matches!(a, CreditAction::Complete));
        let a: CreditAction = serde_json::from_str(r#"{"action":"custom","value":" 1.5 "}"#).unwrap();
        assert!(matches!(a, CreditAction::Custom { value } if value == " 1.5 "));
        assert!(serde_json::from_str::<CreditAction>(r#"{"action":"bonus"}"#).is_err());
    }

    #[test]
    fn test_empty_groups_serialize_every_type() {
        let json = serde_json::to_value(DutiesByType::default()).unwrap();
        for t in DutyType::ALL {
            assert_eq!(json[t.as_str()], serde_json::json!([]));
        }
    }
}
