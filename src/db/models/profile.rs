// src/db/models/profile.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, ToSchema)]
#[sqlx(type_name = "profile_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProfileRole {
    Admin,
    Storekeeper,
    Teacher,
    ProcurementOfficer,
    Bursar,
}

impl ProfileRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileRole::Admin => "admin",
            ProfileRole::Storekeeper => "storekeeper",
            ProfileRole::Teacher => "teacher",
            ProfileRole::ProcurementOfficer => "procurement_officer",
            ProfileRole::Bursar => "bursar",
        }
    }

    /// Roles whose dashboards expose approve/reject controls.
    pub fn can_decide_requests(&self) -> bool {
        !matches!(self, ProfileRole::Teacher)
    }

    pub fn is_admin(&self) -> bool {
        *self == ProfileRole::Admin
    }
}

impl fmt::Display for ProfileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, FromRow, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: ProfileRole,
    pub department: Option<String>,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload built by registration once the password is hashed.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub full_name: String,
    pub email: String,
    pub role: ProfileRole,
    pub department: Option<String>,
    pub password_hash: String,
}

impl NewProfile {
    pub fn into_profile(self, now: DateTime<Utc>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            full_name: self.full_name,
            email: self.email.trim().to_lowercase(),
            role: self.role,
            department: self.department,
            password_hash: self.password_hash,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn teachers_cannot_decide_requests() {
        assert!(!ProfileRole::Teacher.can_decide_requests());
        for role in [
            ProfileRole::Admin,
            ProfileRole::Storekeeper,
            ProfileRole::ProcurementOfficer,
            ProfileRole::Bursar,
        ] {
            assert!(role.can_decide_requests(), "{role} should decide requests");
        }
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let profile = NewProfile {
            full_name: "Peter Otieno".into(),
            email: " Peter@School.AC.KE ".into(),
            role: ProfileRole::Storekeeper,
            department: Some("Science".into()),
            password_hash: "$2b$04$secret".into(),
        }
        .into_profile(Utc::now());

        assert_eq!(profile.email, "peter@school.ac.ke");
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "storekeeper");
    }
}
