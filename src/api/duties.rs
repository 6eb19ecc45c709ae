use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    database::MongoDB,
    jobs::duty_events::DutyEvents,
    middleware::auth::Claims,
    models::{CheckDutyRequest, CreateDutyRequest, DutyResponse, DutyType, UpdateCreditsRequest},
    services::{access_service, duty_service},
    utils::{AppError, AppResult},
};

/// Query-string duty type: anything outside the enum is a 404, like an unknown page.
pub fn parse_duty_type(raw: Option<&str>) -> AppResult<DutyType> {
    raw.unwrap_or("")
        .parse::<DutyType>()
        .map_err(AppError::NotFound)
}

#[derive(Debug, Deserialize)]
pub struct DutyTypeQuery {
    #[serde(rename = "type")]
    pub duty_type: Option<String>,
}

/// GET /api/v1/duties?type=cleaning - Lista duties de um tipo (ordenadas por data)
#[utoipa::path(
    get,
    path = "/api/v1/duties",
    tag = "Duties",
    params(("type" = String, Query, description = "waiter | cleaning | social")),
    responses(
        (status = 200, description = "Duties of the type, oldest first"),
        (status = 404, description = "Unknown duty type")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_duties(
    user: web::ReqData<Claims>,
    query: web::Query<DutyTypeQuery>,
    db: web::Data<MongoDB>,
) -> AppResult<HttpResponse> {
    let duty_type = parse_duty_type(query.duty_type.as_deref())?;
    let caller = access_service::load_caller(&db, &user).await?;
    access_service::ensure_can_manage(&caller, duty_type)?;

    let duties: Vec<DutyResponse> = duty_service::get_duties_by_type(&db, duty_type)
        .await?
        .into_iter()
        .map(DutyResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "type": duty_type,
        "duties": duties,
        "total": duties.len()
    })))
}

/// POST /api/v1/duties - Cria duty e notifica os residentes
#[utoipa::path(
    post,
    path = "/api/v1/duties",
    tag = "Duties",
    request_body = CreateDutyRequest,
    responses(
        (status = 201, description = "Duty created; assignees will be notified by SMS", body = DutyResponse),
        (status = 400, description = "Invalid duty or unknown assignee"),
        (status = 403, description = "Caller may not assign this duty type")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_duty(
    user: web::ReqData<Claims>,
    body: web::Json<CreateDutyRequest>,
    db: web::Data<MongoDB>,
    events: web::Data<DutyEvents>,
) -> AppResult<HttpResponse> {
    let caller = access_service::load_caller(&db, &user).await?;
    access_service::ensure_can_manage(&caller, body.duty_type)?;

    log::info!("📝 POST /duties - '{}' by {}", body.name, caller.netid);

    let duty = duty_service::create_duty(&db, &events, body.into_inner()).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "duty": DutyResponse::from(duty)
    })))
}

/// GET /api/v1/duties/{id}
pub async fn get_duty(
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> AppResult<HttpResponse> {
    let duty = duty_service::get_duty(&db, &path).await?;

    let caller = access_service::load_caller(&db, &user).await?;
    if !duty.is_assigned(&caller.netid) {
        access_service::ensure_can_manage(&caller, duty.duty_type)?;
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "duty": DutyResponse::from(duty)
    })))
}

/// DELETE /api/v1/duties/{id} - Remove duty e notifica os residentes
#[utoipa::path(
    delete,
    path = "/api/v1/duties/{id}",
    tag = "Duties",
    params(("id" = String, Path, description = "Duty ObjectId (hex)")),
    responses(
        (status = 200, description = "Duty deleted; assignees will be notified by SMS"),
        (status = 404, description = "Duty not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_duty(
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    events: web::Data<DutyEvents>,
) -> AppResult<HttpResponse> {
    let duty = duty_service::get_duty(&db, &path).await?;
    let caller = access_service::load_caller(&db, &user).await?;
    access_service::ensure_can_manage(&caller, duty.duty_type)?;

    log::info!("🗑️ DELETE /duties/{} by {}", path, caller.netid);

    let deleted = duty_service::delete_duty(&db, &events, &path).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "duty": DutyResponse::from(deleted)
    })))
}

/// PUT /api/v1/duties/{id}/checked - Marca duty como concluída
#[utoipa::path(
    put,
    path = "/api/v1/duties/{id}/checked",
    tag = "Duties",
    request_body = CheckDutyRequest,
    params(("id" = String, Path, description = "Duty ObjectId (hex)")),
    responses(
        (status = 200, description = "Persisted checked flag"),
        (status = 404, description = "Duty not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn check_duty(
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    body: web::Json<CheckDutyRequest>,
    db: web::Data<MongoDB>,
) -> AppResult<HttpResponse> {
    let duty = duty_service::get_duty(&db, &path).await?;
    let caller = access_service::load_caller(&db, &user).await?;
    access_service::ensure_can_manage(&caller, duty.duty_type)?;

    let updated = duty_service::check_duty(&db, &path, body.checked).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "id": updated.id_hex(),
        "checked": updated.checked
    })))
}

/// PUT /api/v1/duties/{id}/credits/{netid} - Define créditos de um residente
pub async fn update_credits(
    user: web::ReqData<Claims>,
    path: web::Path<(String, String)>,
    body: web::Json<UpdateCreditsRequest>,
    db: web::Data<MongoDB>,
) -> AppResult<HttpResponse> {
    let (id, netid) = path.into_inner();

    let duty = duty_service::get_duty(&db, &id).await?;
    let caller = access_service::load_caller(&db, &user).await?;
    access_service::ensure_can_manage(&caller, duty.duty_type)?;

    let updated = duty_service::update_user_duty_credits(&db, &duty, &netid, body.credits).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "id": updated.id_hex(),
        "netid": netid,
        "credits": updated.credits_for(&netid)
    })))
}
