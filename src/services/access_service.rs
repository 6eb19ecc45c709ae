// Quem pode ver/alterar o quê. O caller é sempre o usuário do token (claims.sub).

use crate::{
    database::MongoDB,
    middleware::auth::Claims,
    models::{DutyType, User},
    services::user_service,
    utils::{AppError, AppResult},
};

/// Loads the caller's user record; a token for an unknown netid is forbidden.
pub async fn load_caller(db: &MongoDB, claims: &Claims) -> AppResult<User> {
    user_service::get_user(db, &claims.sub)
        .await?
        .ok_or_else(|| AppError::Forbidden(format!("No user record for '{}'", claims.sub)))
}

/// Residents see their own roster; assigners and admins see anyone's.
pub fn ensure_can_view_roster(caller: &User, netid: &str) -> AppResult<()> {
    if caller.netid == netid || caller.is_assigner() {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "'{}' may not view duties of '{}'",
            caller.netid, netid
        )))
    }
}

/// Creating, deleting and checking off duties of a type
pub fn ensure_can_manage(caller: &User, duty_type: DutyType) -> AppResult<()> {
    if caller.can_assign(duty_type) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "'{}' may not manage {} duties",
            caller.netid, duty_type
        )))
    }
}

pub fn ensure_admin(caller: &User) -> AppResult<()> {
    if caller.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!("'{}' is not an admin", caller.netid)))
    }
}
