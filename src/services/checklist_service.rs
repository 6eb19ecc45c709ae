// ==================== CHECKLIST ====================
// Lado servidor da página "Check Duties": visibilidade das duties
// marcadas e as ações complete / missing / custom sobre os créditos.

use chrono::FixedOffset;

use crate::{
    database::MongoDB,
    models::{
        first_name, ChecklistAssignee, ChecklistDuty, ChecklistResponse, CreditAction,
        CreditStatus, CreditUpdateResponse, Duty, DutyType,
    },
    services::duty_service,
    utils::{dates, AppError, AppResult},
};

/// Checked duties are hidden unless the checker asked to see them.
pub fn is_visible(checked: bool, show_checked: bool) -> bool {
    !checked || show_checked
}

fn to_checklist_duty(duty: &Duty, offset: FixedOffset) -> ChecklistDuty {
    let assignees = duty
        .assigned
        .iter()
        .map(|netid| {
            let name = duty.name_for(netid).to_string();
            let credits = duty.credits_for(netid);
            ChecklistAssignee {
                netid: netid.clone(),
                first_name: first_name(&name).to_string(),
                name,
                credits,
                status: CreditStatus::from_credits(credits),
            }
        })
        .collect();

    ChecklistDuty {
        id: duty.id_hex(),
        name: duty.name.clone(),
        date_label: dates::format_month_day(&duty.time(), offset),
        checked: duty.checked,
        assignees,
    }
}

pub fn build_checklist(
    duty_type: DutyType,
    duties: &[Duty],
    show_checked: bool,
    offset: FixedOffset,
) -> ChecklistResponse {
    let visible: Vec<ChecklistDuty> = duties
        .iter()
        .filter(|d| is_visible(d.checked, show_checked))
        .map(|d| to_checklist_duty(d, offset))
        .collect();

    ChecklistResponse {
        success: true,
        duty_type,
        show_checked,
        hidden_count: duties.len() - visible.len(),
        duties: visible,
    }
}

/// Credits to write for an action, or None when nothing should be written.
pub fn plan_credit_action(current: f64, action: &CreditAction) -> AppResult<Option<f64>> {
    match action {
        CreditAction::Complete if current == 1.0 => Ok(None),
        CreditAction::Complete => Ok(Some(1.0)),
        CreditAction::Missing if current == 0.0 => Ok(None),
        CreditAction::Missing => Ok(Some(0.0)),
        CreditAction::Custom { value } => {
            let value = value.trim();
            if value.is_empty() {
                return Ok(None);
            }
            let credits: f64 = value.parse().map_err(|_| {
                AppError::InvalidRequest(
                    "Invalid credit amount. Enter a whole number or decimal (no fractions)."
                        .to_string(),
                )
            })?;
            duty_service::validate_credits(credits)?;
            Ok(Some(credits))
        }
    }
}

pub async fn apply_credit_action(
    db: &MongoDB,
    duty: &Duty,
    netid: &str,
    action: &CreditAction,
) -> AppResult<CreditUpdateResponse> {
    duty_service::ensure_assigned(duty, netid)?;

    let current = duty.credits_for(netid);
    let (credits, written) = match plan_credit_action(current, action)? {
        Some(credits) => {
            let updated = duty_service::update_user_duty_credits(db, duty, netid, credits).await?;
            (updated.credits_for(netid), true)
        }
        None => (current, false),
    };

    Ok(CreditUpdateResponse {
        success: true,
        duty_id: duty.id_hex(),
        netid: netid.to_string(),
        credits,
        status: CreditStatus::from_credits(credits),
        written,
    })
}
