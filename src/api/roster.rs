use actix_web::{web, HttpResponse};

use crate::{
    config::AppConfig,
    database::MongoDB,
    middleware::auth::Claims,
    models::{DutiesByType, RosterResponse, User},
    services::{access_service, duty_service, user_service},
    utils::AppResult,
};

/// GET /api/v1/roster/{netid} - Duties de um residente agrupadas por tipo
///
/// 404 quando o usuário não existe. Se a busca das duties falhar, responde
/// `error: true` com os grupos vazios.
#[utoipa::path(
    get,
    path = "/api/v1/roster/{netid}",
    tag = "Roster",
    params(("netid" = String, Path, description = "University id")),
    responses(
        (status = 200, description = "User and duties grouped by type", body = RosterResponse),
        (status = 403, description = "Caller may not view this roster"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_roster(
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let netid = path.into_inner();

    let caller = access_service::load_caller(&db, &user).await?;
    access_service::ensure_can_view_roster(&caller, &netid)?;

    let owner = user_service::require_user(&db, &netid).await?;

    let duties = duty_service::get_duties_by_user(&db, &netid, config.notify_offset).await;

    let response = roster_response(owner, duties);
    Ok(HttpResponse::Ok().json(response))
}

/// A failed duty lookup still renders the page, flagged with `error: true`
pub fn roster_response(owner: User, duties: AppResult<DutiesByType>) -> RosterResponse {
    match duties {
        Ok(duties) => {
            log::debug!("📋 Roster {}: {} duties", owner.netid, duties.total());
            RosterResponse {
                success: true,
                error: false,
                user: owner,
                duties,
            }
        }
        Err(e) => {
            log::error!("❌ Failed to load duties for {}: {}", owner.netid, e);
            RosterResponse {
                success: false,
                error: true,
                user: owner,
                duties: DutiesByType::default(),
            }
        }
    }
}
