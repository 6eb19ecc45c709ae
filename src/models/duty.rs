use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Tipo de duty (serializado em minúsculas: "waiter", "cleaning", "social")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DutyType {
    Waiter,
    Cleaning,
    Social,
}

impl DutyType {
    pub const ALL: [DutyType; 3] = [DutyType::Waiter, DutyType::Cleaning, DutyType::Social];

    pub fn as_str(&self) -> &'static str {
        match self {
            DutyType::Waiter => "waiter",
            DutyType::Cleaning => "cleaning",
            DutyType::Social => "social",
        }
    }
}

impl fmt::Display for DutyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DutyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DutyType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown duty type '{}'", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutyDate {
    pub time: BsonDateTime,
}

/// Duty armazenada no MongoDB (collection "duties")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Duty {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub name: String,

    #[serde(rename = "type")]
    pub duty_type: DutyType,

    pub date: DutyDate,

    /// netids dos residentes
    pub assigned: Vec<String>,

    /// Nomes capturados na criação (netid -> nome)
    #[serde(default)]
    pub assigned_names: BTreeMap<String, String>,

    /// Créditos por residente (netid -> créditos)
    #[serde(default)]
    pub credits: BTreeMap<String, f64>,

    #[serde(default)]
    pub checked: bool,

    #[serde(default)]
    pub created_at: i64,

    #[serde(default)]
    pub updated_at: i64,
}

impl Duty {
    pub fn time(&self) -> DateTime<Utc> {
        bson_to_chrono(self.date.time)
    }

    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.time() < now
    }

    pub fn credits_for(&self, netid: &str) -> f64 {
        self.credits.get(netid).copied().unwrap_or(0.0)
    }

    pub fn is_assigned(&self, netid: &str) -> bool {
        self.assigned.iter().any(|a| a == netid)
    }

    /// Display name for an assignee; falls back to the netid.
    pub fn name_for<'a>(&'a self, netid: &'a str) -> &'a str {
        self.assigned_names
            .get(netid)
            .map(String::as_str)
            .unwrap_or(netid)
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

pub fn bson_to_chrono(time: BsonDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(time.timestamp_millis()).unwrap_or_default()
}

pub fn chrono_to_bson(time: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(time.timestamp_millis())
}

/// Request para criar duty
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateDutyRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub duty_type: DutyType,
    pub time: DateTime<Utc>,
    pub assigned: Vec<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CheckDutyRequest {
    pub checked: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateCreditsRequest {
    pub credits: f64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DutyDateResponse {
    pub time: DateTime<Utc>,
}

/// Response de duty
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DutyResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub duty_type: DutyType,
    pub date: DutyDateResponse,
    pub assigned: Vec<String>,
    pub assigned_names: BTreeMap<String, String>,
    pub credits: BTreeMap<String, f64>,
    pub checked: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Duty> for DutyResponse {
    fn from(duty: Duty) -> Self {
        DutyResponse {
            id: duty.id_hex(),
            date: DutyDateResponse { time: duty.time() },
            name: duty.name,
            duty_type: duty.duty_type,
            assigned: duty.assigned,
            assigned_names: duty.assigned_names,
            credits: duty.credits,
            checked: duty.checked,
            created_at: duty.created_at,
            updated_at: duty.updated_at,
        }
    }
}


#[cfg(test)]
pub(crate) use tests::sample_duty;
