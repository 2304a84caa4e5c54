use serde::{Deserialize, Serialize};

use crate::model::{
    api::id::ApiId,
    db::admin::{Admin, AdminRole},
};

/// Raw admin credentials, received from a user. These are never stored directly,
/// since the password is in plaintext.
#[derive(Clone, Deserialize, Serialize)]
pub struct AdminLogin {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// An admin account as submitted for creation or update.
///
/// The password is plaintext; on update it may be omitted or blank to keep
/// the current one.
#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSpec {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub role: AdminRole,
}

/// An admin account as returned by the API.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDescription {
    pub id: ApiId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: AdminRole,
}

impl From<Admin> for AdminDescription {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id.into(),
            username: admin.admin.username,
            first_name: admin.admin.first_name,
            last_name: admin.admin.last_name,
            email: admin.admin.email,
            role: admin.admin.role,
        }
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl AdminSpec {
        pub fn example1() -> Self {
            Self {
                username: "alice112".into(),
                password: Some("dreamteam".into()),
                first_name: "Alice".into(),
                last_name: "Adams".into(),
                email: "alice@uni.example".into(),
                role: AdminRole::Admin,
            }
        }

        pub fn example2() -> Self {
            Self {
                username: "bobthesuperadmin".into(),
                password: Some("totallysecurepassword".into()),
                first_name: "Bob".into(),
                last_name: "Brown".into(),
                email: "bob@uni.example".into(),
                role: AdminRole::SuperAdmin,
            }
        }
    }
}
