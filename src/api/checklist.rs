use actix_web::{web, HttpResponse};

use crate::{
    api::duties::parse_duty_type,
    config::AppConfig,
    database::MongoDB,
    middleware::auth::Claims,
    models::{ChecklistQuery, ChecklistResponse, CreditAction, CreditUpdateResponse},
    services::{access_service, checklist_service, duty_service},
    utils::AppResult,
};

/// GET /api/v1/checklist?type=waiter&show_checked=false
#[utoipa::path(
    get,
    path = "/api/v1/checklist",
    tag = "Checklist",
    params(
        ("type" = String, Query, description = "waiter | cleaning | social"),
        ("show_checked" = Option<bool>, Query, description = "Include checked-off duties")
    ),
    responses(
        (status = 200, description = "Visible duties with per-assignee credit status", body = ChecklistResponse),
        (status = 404, description = "Unknown duty type")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_checklist(
    user: web::ReqData<Claims>,
    query: web::Query<ChecklistQuery>,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let duty_type = parse_duty_type(query.duty_type.as_deref())?;
    let caller = access_service::load_caller(&db, &user).await?;
    access_service::ensure_can_manage(&caller, duty_type)?;

    let duties = duty_service::get_duties_by_type(&db, duty_type).await?;
    let checklist =
        checklist_service::build_checklist(duty_type, &duties, query.show_checked, config.notify_offset);

    log::debug!(
        "📋 Checklist {}: {} visible, {} hidden",
        duty_type,
        checklist.duties.len(),
        checklist.hidden_count
    );

    Ok(HttpResponse::Ok().json(checklist))
}

/// POST /api/v1/checklist/{id}/assignees/{netid} - complete / missing / custom
#[utoipa::path(
    post,
    path = "/api/v1/checklist/{id}/assignees/{netid}",
    tag = "Checklist",
    request_body = CreditAction,
    params(
        ("id" = String, Path, description = "Duty ObjectId (hex)"),
        ("netid" = String, Path, description = "Assignee")
    ),
    responses(
        (status = 200, description = "Persisted credits; `written` is false when nothing changed", body = CreditUpdateResponse),
        (status = 400, description = "Invalid credit amount or netid not assigned"),
        (status = 404, description = "Duty not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_assignee(
    user: web::ReqData<Claims>,
    path: web::Path<(String, String)>,
    body: web::Json<CreditAction>,
    db: web::Data<MongoDB>,
) -> AppResult<HttpResponse> {
    let (id, netid) = path.into_inner();

    let duty = duty_service::get_duty(&db, &id).await?;
    let caller = access_service::load_caller(&db, &user).await?;
    access_service::ensure_can_manage(&caller, duty.duty_type)?;

    let response = checklist_service::apply_credit_action(&db, &duty, &netid, &body).await?;

    Ok(HttpResponse::Ok().json(response))
}
