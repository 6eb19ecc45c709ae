use actix_web::{web, HttpResponse};

use crate::{
    database::MongoDB,
    middleware::auth::Claims,
    models::{UpsertUserRequest, User, UserCreditsResponse},
    services::{access_service, user_service},
    utils::AppResult,
};

/// GET /api/v1/users/me - Usuário do token
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Caller's user record", body = User),
        (status = 403, description = "Token netid has no user record")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(user: web::ReqData<Claims>, db: web::Data<MongoDB>) -> AppResult<HttpResponse> {
    let caller = access_service::load_caller(&db, &user).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": caller
    })))
}

/// GET /api/v1/users - Lista usuários (assigners montam as duties a partir daqui)
pub async fn list_users(user: web::ReqData<Claims>, db: web::Data<MongoDB>) -> AppResult<HttpResponse> {
    let caller = access_service::load_caller(&db, &user).await?;
    if !caller.is_assigner() {
        access_service::ensure_admin(&caller)?;
    }

    let users = user_service::list_users(&db).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "users": users,
        "total": users.len()
    })))
}

/// GET /api/v1/users/{netid}
pub async fn get_user(
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> AppResult<HttpResponse> {
    let caller = access_service::load_caller(&db, &user).await?;
    access_service::ensure_can_view_roster(&caller, &path)?;

    let found = user_service::require_user(&db, &path).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": found
    })))
}

/// PUT /api/v1/users/{netid} - Cria ou substitui usuário (admin)
#[utoipa::path(
    put,
    path = "/api/v1/users/{netid}",
    tag = "Users",
    request_body = UpsertUserRequest,
    params(("netid" = String, Path, description = "University id")),
    responses(
        (status = 200, description = "Stored user", body = User),
        (status = 400, description = "Invalid netid, name or phone"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upsert_user(
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    body: web::Json<UpsertUserRequest>,
    db: web::Data<MongoDB>,
) -> AppResult<HttpResponse> {
    let caller = access_service::load_caller(&db, &user).await?;
    access_service::ensure_admin(&caller)?;

    let stored = user_service::upsert_user(&db, &path, body.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "user": stored
    })))
}

/// DELETE /api/v1/users/{netid} (admin)
pub async fn delete_user(
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> AppResult<HttpResponse> {
    let caller = access_service::load_caller(&db, &user).await?;
    access_service::ensure_admin(&caller)?;

    user_service::delete_user(&db, &path).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "netid": path.into_inner()
    })))
}

/// GET /api/v1/users/{netid}/credits - Total de créditos do residente
#[utoipa::path(
    get,
    path = "/api/v1/users/{netid}/credits",
    tag = "Users",
    params(("netid" = String, Path, description = "University id")),
    responses(
        (status = 200, description = "Sum of credits across all duties", body = UserCreditsResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user_credits(
    user: web::ReqData<Claims>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> AppResult<HttpResponse> {
    let caller = access_service::load_caller(&db, &user).await?;
    access_service::ensure_can_view_roster(&caller, &path)?;

    let credits = user_service::user_credit_total(&db, &path).await?;
    Ok(HttpResponse::Ok().json(credits))
}
