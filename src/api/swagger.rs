use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Duty Roster API",
        version = "1.0.0",
        description = "Residence-hall duty roster. \n\n**Authentication:** every `/api/v1` endpoint requires a JWT Bearer token whose subject is the caller's netid.\n\n**Features:**\n- Duty assignment with SMS notifications on create/delete\n- Check-off checklist with per-resident credits\n- Per-resident roster grouped by duty type"
    ),
    paths(
        // Health & Metrics
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,

        // Duties
        crate::api::duties::list_duties,
        crate::api::duties::create_duty,
        crate::api::duties::delete_duty,
        crate::api::duties::check_duty,

        // Checklist
        crate::api::checklist::get_checklist,
        crate::api::checklist::mark_assignee,

        // Roster
        crate::api::roster::get_roster,

        // Users
        crate::api::users::get_me,
        crate::api::users::upsert_user,
        crate::api::users::get_user_credits,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::api::metrics::MetricsResponse,
            crate::models::DutyType,
            crate::models::CreateDutyRequest,
            crate::models::CheckDutyRequest,
            crate::models::UpdateCreditsRequest,
            crate::models::DutyResponse,
            crate::models::CreditAction,
            crate::models::CreditStatus,
            crate::models::ChecklistResponse,
            crate::models::CreditUpdateResponse,
            crate::models::RosterResponse,
            crate::models::User,
            crate::models::UpsertUserRequest,
            crate::models::UserCreditsResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check and system metrics endpoints for monitoring service status."),
        (name = "Duties", description = "Create, list, delete and check off duties. Create and delete send SMS to assignees."),
        (name = "Checklist", description = "Check-off view for one duty type and per-resident credit actions."),
        (name = "Roster", description = "Duties assigned to one resident, grouped by type."),
        (name = "Users", description = "Residents and staff, keyed by netid."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT issued by the hall login gateway (sub = netid)"))
                        .build()
                ),
            );
        }
    }
}
