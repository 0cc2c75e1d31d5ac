use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub iat: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Authenticated caller, resolved once at the token boundary. Everything past
/// this point branches on the variant, never on a role string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Principal {
    Doctor(Uuid),
    Patient(Uuid),
}

impl Principal {
    pub fn from_user(user: &User) -> Option<Self> {
        let id = Uuid::parse_str(&user.id).ok()?;
        match user.role.as_deref() {
            Some("doctor") => Some(Principal::Doctor(id)),
            Some("patient") => Some(Principal::Patient(id)),
            _ => None,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Principal::Doctor(id) | Principal::Patient(id) => *id,
        }
    }
}
