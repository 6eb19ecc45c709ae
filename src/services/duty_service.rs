// ==================== DUTIES ====================
// CRUD das duties (collection "duties"). Escritas diretas, last write wins.

use chrono::{FixedOffset, Utc};
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::ReturnDocument,
};
use std::collections::BTreeMap;

use crate::{
    database::{MongoDB, DUTIES},
    jobs::duty_events::{DutyEvent, DutyEvents},
    models::{
        chrono_to_bson, is_valid_netid, CreateDutyRequest, DutiesByType, Duty, DutyDate,
        DutyType, RosterDutyItem, User,
    },
    services::notification_service::UserDirectory,
    utils::{dates, AppError, AppResult},
};

pub fn parse_duty_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidRequest("Invalid duty ID".to_string()))
}

/// Removes duplicates while keeping the order assigners typed
fn dedup_assigned(assigned: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(assigned.len());
    for netid in assigned {
        let netid = netid.trim();
        if !seen.iter().any(|s: &String| s == netid) {
            seen.push(netid.to_string());
        }
    }
    seen
}

/// Builds the document to insert; `users` must match `assigned` one-to-one.
pub fn build_duty(request: &CreateDutyRequest, users: &[User], now: i64) -> Duty {
    let assigned: Vec<String> = users.iter().map(|u| u.netid.clone()).collect();
    let assigned_names: BTreeMap<String, String> = users
        .iter()
        .map(|u| (u.netid.clone(), u.name.clone()))
        .collect();
    let credits: BTreeMap<String, f64> = users.iter().map(|u| (u.netid.clone(), 0.0)).collect();

    Duty {
        id: None,
        name: request.name.trim().to_string(),
        duty_type: request.duty_type,
        date: DutyDate {
            time: chrono_to_bson(request.time),
        },
        assigned,
        assigned_names,
        credits,
        checked: false,
        created_at: now,
        updated_at: now,
    }
}

pub fn validate_create(request: &CreateDutyRequest) -> AppResult<Vec<String>> {
    if request.name.trim().is_empty() {
        return Err(AppError::InvalidRequest("Duty name is required".to_string()));
    }

    let assigned = dedup_assigned(&request.assigned);
    if assigned.is_empty() {
        return Err(AppError::InvalidRequest(
            "At least one resident must be assigned".to_string(),
        ));
    }

    if let Some(bad) = assigned.iter().find(|n| !is_valid_netid(n)) {
        return Err(AppError::InvalidRequest(format!("Invalid netid '{}'", bad)));
    }

    Ok(assigned)
}

/// Looks up every assignee in order; an unknown netid is a 400.
pub async fn resolve_assignees(
    directory: &dyn UserDirectory,
    assigned: &[String],
) -> AppResult<Vec<User>> {
    let mut users = Vec::with_capacity(assigned.len());
    for netid in assigned {
        match directory.find_user(netid).await? {
            Some(user) => users.push(user),
            None => {
                return Err(AppError::InvalidRequest(format!(
                    "Assigned user '{}' does not exist",
                    netid
                )))
            }
        }
    }
    Ok(users)
}

/// POST /duties - cria a duty e publica DutyEvent::Created
pub async fn create_duty(
    db: &MongoDB,
    events: &DutyEvents,
    request: CreateDutyRequest,
) -> AppResult<Duty> {
    let assigned = validate_create(&request)?;
    let users = resolve_assignees(db, &assigned).await?;

    let mut duty = build_duty(&request, &users, Utc::now().timestamp());

    let result = db.collection::<Duty>(DUTIES).insert_one(&duty).await?;
    duty.id = Some(result.inserted_id.as_object_id().ok_or_else(|| {
        AppError::DatabaseError("Inserted duty has no ObjectId".to_string())
    })?);

    log::info!(
        "📝 Duty created: '{}' ({}) for {} residents",
        duty.name,
        duty.duty_type,
        duty.assigned.len()
    );

    events.publish(DutyEvent::Created(duty.clone()));

    Ok(duty)
}

pub async fn get_duty(db: &MongoDB, id: &str) -> AppResult<Duty> {
    let object_id = parse_duty_id(id)?;
    db.collection::<Duty>(DUTIES)
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Duty not found".to_string()))
}

/// DELETE /duties/{id} - remove e publica DutyEvent::Deleted com o documento removido
pub async fn delete_duty(db: &MongoDB, events: &DutyEvents, id: &str) -> AppResult<Duty> {
    let object_id = parse_duty_id(id)?;
    let duty = db
        .collection::<Duty>(DUTIES)
        .find_one_and_delete(doc! { "_id": object_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Duty not found".to_string()))?;

    log::info!("🗑️ Duty deleted: '{}' ({})", duty.name, duty.duty_type);

    events.publish(DutyEvent::Deleted(duty.clone()));

    Ok(duty)
}

/// Duties de um tipo, ordenadas por data
pub async fn get_duties_by_type(db: &MongoDB, duty_type: DutyType) -> AppResult<Vec<Duty>> {
    let duties: Vec<Duty> = db
        .collection::<Duty>(DUTIES)
        .find(doc! { "type": duty_type.as_str() })
        .sort(doc! { "date.time": 1 })
        .await?
        .try_collect()
        .await?;
    Ok(duties)
}

/// Duties de um residente agrupadas por tipo (para o roster)
pub async fn get_duties_by_user(
    db: &MongoDB,
    netid: &str,
    offset: FixedOffset,
) -> AppResult<DutiesByType> {
    let duties: Vec<Duty> = db
        .collection::<Duty>(DUTIES)
        .find(doc! { "assigned": netid })
        .sort(doc! { "date.time": 1 })
        .await?
        .try_collect()
        .await?;

    Ok(group_by_type(duties, offset))
}

pub fn group_by_type(mut duties: Vec<Duty>, offset: FixedOffset) -> DutiesByType {
    duties.sort_by_key(|d| d.date.time.timestamp_millis());

    let mut grouped = DutiesByType::default();
    for duty in duties {
        let time = duty.time();
        grouped.bucket_mut(duty.duty_type).push(RosterDutyItem {
            id: duty.id_hex(),
            date_label: dates::format_short(&time, offset),
            date: time,
            name: duty.name,
        });
    }
    grouped
}

async fn set_fields(db: &MongoDB, id: &str, mut set: Document) -> AppResult<Duty> {
    let object_id = parse_duty_id(id)?;
    set.insert("updated_at", Utc::now().timestamp());

    db.collection::<Duty>(DUTIES)
        .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": set })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("Duty not found".to_string()))
}

/// Marca/desmarca a duty como concluída; retorna o valor persistido
pub async fn check_duty(db: &MongoDB, id: &str, checked: bool) -> AppResult<Duty> {
    let duty = set_fields(db, id, doc! { "checked": checked }).await?;
    log::info!("☑️ Duty '{}' checked = {}", duty.name, duty.checked);
    Ok(duty)
}

pub fn validate_credits(credits: f64) -> AppResult<()> {
    if !credits.is_finite() || credits < 0.0 {
        return Err(AppError::InvalidRequest(
            "Invalid credit amount. Enter a whole number or decimal (no fractions).".to_string(),
        ));
    }
    Ok(())
}

/// Credits can only be given to residents on the duty
pub fn ensure_assigned(duty: &Duty, netid: &str) -> AppResult<()> {
    if duty.is_assigned(netid) {
        Ok(())
    } else {
        Err(AppError::InvalidRequest(format!(
            "'{}' is not assigned to '{}'",
            netid, duty.name
        )))
    }
}

/// Atualiza os créditos de um residente; retorna a duty persistida
pub async fn update_user_duty_credits(
    db: &MongoDB,
    duty: &Duty,
    netid: &str,
    credits: f64,
) -> AppResult<Duty> {
    validate_credits(credits)?;
    ensure_assigned(duty, netid)?;

    let mut set = Document::new();
    set.insert(format!("credits.{}", netid), credits);

    let updated = set_fields(db, &duty.id_hex(), set).await?;
    log::info!(
        "🎯 Credits for {} on '{}' = {}",
        netid,
        updated.name,
        updated.credits_for(netid)
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::duty::sample_duty;
    use crate::services::notification_service::testing::{directory_of, resident as user_with_phone};
    use crate::services::user_service;
    use actix_web::ResponseError;
    use chrono::TimeZone;

    fn request(name: &str, assigned: &[&str]) -> CreateDutyRequest {
        CreateDutyRequest {
            name: name.into(),
            duty_type: DutyType::Waiter,
            time: Utc.with_ymd_and_hms(2023, 3, 6, 18, 0, 0).unwrap(),
            assigned: assigned.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn resident(netid: &str, name: &str) -> User {
        User {
            netid: netid.into(),
            name: name.into(),
            phone: "5550000000".into(),
            is_admin: false,
            assigns: vec![],
        }
    }

    #[test]
    fn test_parse_duty_id() {
        assert!(parse_duty_id("64b7f0c2a1b2c3d4e5f60718").is_ok());
        assert!(matches!(parse_duty_id("nope"), Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn test_validate_create() {
        assert_eq!(
            validate_create(&request("Dinner", &["jd123", " jd123 ", "ab456"])).unwrap(),
            vec!["jd123", "ab456"]
        );
        assert!(validate_create(&request("  ", &["jd123"])).is_err());
        assert!(validate_create(&request("Dinner", &[])).is_err());
        assert!(validate_create(&request("Dinner", &["a.b"])).is_err());
    }

    #[test]
    fn test_build_duty_initializes_credits_and_names() {
        let users = vec![resident("jd123", "Jane Doe"), resident("ab456", "Alex Brown")];
        let duty = build_duty(&request(" Dinner ", &["jd123", "ab456"]), &users, 42);

        assert_eq!(duty.name, "Dinner");
        assert_eq!(duty.assigned, vec!["jd123", "ab456"]);
        assert_eq!(duty.assigned_names["ab456"], "Alex Brown");
        assert_eq!(duty.credits_for("jd123"), 0.0);
        assert_eq!(duty.credits.len(), 2);
        assert!(!duty.checked);
        assert_eq!(duty.created_at, 42);
    }

    #[test]
    fn test_group_by_type_sorts_and_labels() {
        let mut later = sample_duty();
        later.name = "Bathrooms".into();
        later.date.time = chrono_to_bson(Utc.with_ymd_and_hms(2023, 3, 20, 18, 0, 0).unwrap());
        let mut social = sample_duty();
        social.duty_type = DutyType::Social;
        social.name = "Mixer".into();

        let grouped = group_by_type(vec![later, sample_duty(), social], dates::utc_offset());

        assert!(grouped.waiter.is_empty());
        assert_eq!(grouped.social.len(), 1);
        let names: Vec<_> = grouped.cleaning.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Kitchen", "Bathrooms"]);
        assert_eq!(grouped.cleaning[0].date_label, "3/6/23");
        assert_eq!(grouped.total(), 3);
    }

    #[test]
    fn test_validate_credits() {
        assert!(validate_credits(0.0).is_ok());
        assert!(validate_credits(1.5).is_ok());
        assert!(validate_credits(-1.0).is_err());
        assert!(validate_credits(f64::NAN).is_err());
        assert!(validate_credits(f64::INFINITY).is_err());
    }

    #[test]
    fn test_ensure_assigned() {
        let duty = sample_duty();
        assert!(ensure_assigned(&duty, "jd123").is_ok());
        assert!(matches!(
            ensure_assigned(&duty, "zz999"),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_assignees() {
        let directory = directory_of(vec![
            user_with_phone("jd123", "Jane Doe", "5551234567"),
            user_with_phone("ab456", "Alex Brown", "5559876543"),
        ]);

        let users = resolve_assignees(&directory, &["ab456".to_string(), "jd123".to_string()])
            .await
            .unwrap();
        let netids: Vec<_> = users.iter().map(|u| u.netid.as_str()).collect();
        assert_eq!(netids, vec!["ab456", "jd123"]);

        let err = resolve_assignees(&directory, &["jd123".to_string(), "zz999".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(ref msg) if msg.contains("zz999")));
        assert_eq!(err.status_code(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_duty_lifecycle() {
        use crate::models::UpsertUserRequest;

        let db = MongoDB::new("mongodb://localhost:27017/duty_roster_test").await.unwrap();
        let (events, mut rx) = DutyEvents::channel();

        user_service::upsert_user(
            &db,
            "tst002",
            UpsertUserRequest {
                name: "Test Resident".into(),
                phone: "5550002222".into(),
                is_admin: false,
                assigns: vec![],
            },
        )
        .await
        .unwrap();

        let duty = create_duty(&db, &events, request("Dinner", &["tst002"])).await.unwrap();
        assert!(matches!(rx.recv().await, Some(DutyEvent::Created(_))));

        let id = duty.id_hex();
        assert!(check_duty(&db, &id, true).await.unwrap().checked);

        let updated = update_user_duty_credits(&db, &duty, "tst002", 1.0).await.unwrap();
        assert_eq!(updated.credits_for("tst002"), 1.0);

        let waiters = get_duties_by_type(&db, DutyType::Waiter).await.unwrap();
        assert!(waiters.iter().any(|d| d.id == duty.id));

        delete_duty(&db, &events, &id).await.unwrap();
        assert!(matches!(rx.recv().await, Some(DutyEvent::Deleted(_))));
        assert!(matches!(get_duty(&db, &id).await, Err(AppError::NotFound(_))));

        user_service::delete_user(&db, "tst002").await.unwrap();
    }
}
