// ==================== USERS ====================
// Residentes e staff, chaveados pelo netid (collection "users")

use futures::stream::TryStreamExt;
use mongodb::bson::doc;

use crate::{
    database::{MongoDB, DUTIES, USERS},
    models::{is_valid_netid, Duty, UpsertUserRequest, User, UserCreditsResponse},
    utils::{phone, AppError, AppResult},
};

pub async fn get_user(db: &MongoDB, netid: &str) -> AppResult<Option<User>> {
    let collection = db.collection::<User>(USERS);
    Ok(collection.find_one(doc! { "netid": netid }).await?)
}

pub async fn require_user(db: &MongoDB, netid: &str) -> AppResult<User> {
    get_user(db, netid)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", netid)))
}

/// Todos os usuários, ordenados por nome
pub async fn list_users(db: &MongoDB) -> AppResult<Vec<User>> {
    let collection = db.collection::<User>(USERS);
    let users: Vec<User> = collection
        .find(doc! {})
        .sort(doc! { "name": 1 })
        .await?
        .try_collect()
        .await?;
    Ok(users)
}

/// Validates the request and builds the stored record (phone normalized).
pub fn build_user(netid: &str, request: UpsertUserRequest) -> AppResult<User> {
    if !is_valid_netid(netid) {
        return Err(AppError::InvalidRequest(format!("Invalid netid '{}'", netid)));
    }

    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest("Name is required".to_string()));
    }

    if !phone::is_valid(&request.phone) {
        return Err(AppError::InvalidRequest(format!(
            "Invalid phone number '{}'",
            request.phone
        )));
    }

    let mut assigns = request.assigns;
    assigns.sort();
    assigns.dedup();

    Ok(User {
        netid: netid.to_string(),
        name: name.to_string(),
        phone: phone::normalize(&request.phone),
        is_admin: request.is_admin,
        assigns,
    })
}

/// Create or replace by netid
pub async fn upsert_user(db: &MongoDB, netid: &str, request: UpsertUserRequest) -> AppResult<User> {
    let user = build_user(netid, request)?;

    let collection = db.collection::<User>(USERS);
    let result = collection
        .replace_one(doc! { "netid": &user.netid }, &user)
        .upsert(true)
        .await?;

    if result.upserted_id.is_some() {
        log::info!("👤 User created: {}", user.netid);
    } else {
        log::info!("👤 User updated: {}", user.netid);
    }

    Ok(user)
}

pub async fn delete_user(db: &MongoDB, netid: &str) -> AppResult<()> {
    let collection = db.collection::<User>(USERS);
    let result = collection.delete_one(doc! { "netid": netid }).await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound(format!("User '{}' not found", netid)));
    }

    // Duties existentes mantêm o netid; não há integridade referencial
    log::info!("🗑️ User deleted: {}", netid);
    Ok(())
}

/// Soma dos créditos do usuário em todas as duties
pub async fn user_credit_total(db: &MongoDB, netid: &str) -> AppResult<UserCreditsResponse> {
    require_user(db, netid).await?;

    let duties: Vec<Duty> = db
        .collection::<Duty>(DUTIES)
        .find(doc! { "assigned": netid })
        .await?
        .try_collect()
        .await?;

    Ok(sum_credits(netid, &duties))
}

pub fn sum_credits(netid: &str, duties: &[Duty]) -> UserCreditsResponse {
    UserCreditsResponse {
        netid: netid.to_string(),
        total_credits: duties.iter().map(|d| d.credits_for(netid)).sum(),
        duties_counted: duties.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{duty::sample_duty, DutyType};

    fn request(name: &str, phone: &str) -> UpsertUserRequest {
        UpsertUserRequest {
            name: name.into(),
            phone: phone.into(),
            is_admin: false,
            assigns: vec![DutyType::Social, DutyType::Waiter, DutyType::Social],
        }
    }

    #[test]
    fn test_build_user_normalizes() {
        let user = build_user("jd123", request("  Jane Doe ", "(555) 123-4567")).unwrap();
        assert_eq!(user.name, "Jane Doe");
        assert_eq!(user.phone, "5551234567");
        assert_eq!(user.assigns, vec![DutyType::Waiter, DutyType::Social]);
    }

    #[test]
    fn test_build_user_rejects_bad_input() {
        assert!(matches!(
            build_user("j.d", request("Jane", "5551234567")),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            build_user("jd123", request("  ", "5551234567")),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            build_user("jd123", request("Jane", "123")),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_sum_credits() {
        let mut second = sample_duty();
        second.credits.insert("ab456".into(), 0.5);
        let duties = vec![sample_duty(), second];

        let jane = sum_credits("jd123", &duties);
        assert_eq!(jane.total_credits, 2.0);
        assert_eq!(jane.duties_counted, 2);

        let alex = sum_credits("ab456", &duties);
        assert_eq!(alex.total_credits, 0.5);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_upsert_and_delete_user() {
        dotenv::dotenv().ok();
        let db = MongoDB::new("mongodb://localhost:27017/duty_roster_test").await.unwrap();

        let user = upsert_user(&db, "tst001", request("Test User", "5550001111")).await.unwrap();
        assert_eq!(get_user(&db, "tst001").await.unwrap(), Some(user));

        delete_user(&db, "tst001").await.unwrap();
        assert!(get_user(&db, "tst001").await.unwrap().is_none());
        assert!(matches!(delete_user(&db, "tst001").await, Err(AppError::NotFound(_))));
    }
}
