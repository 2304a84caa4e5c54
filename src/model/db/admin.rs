use std::ops::{Deref, DerefMut};

use log::{debug, info, warn};
use mongodb::{
    bson::{doc, Bson},
    Database,
};
use serde::{Deserialize, Serialize};

use crate::config::SeedAdminConfig;
use crate::error::Result;
use crate::model::mongodb::{Coll, Id};

use super::password::{hash_password, verify_password};

/// Administrative roles.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminRole {
    SuperAdmin,
    #[default]
    Admin,
}

impl From<AdminRole> for Bson {
    fn from(role: AdminRole) -> Self {
        let name = match role {
            AdminRole::SuperAdmin => "SuperAdmin",
            AdminRole::Admin => "Admin",
        };
        Bson::String(name.to_string())
    }
}

/// Core admin user data.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCore {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: AdminRole,
}

impl AdminCore {
    /// Check whether the given password is correct.
    pub fn verify_password(&self, password: &str) -> bool {
        verify_password(&self.password_hash, password)
    }
}

/// An admin without an ID.
pub type NewAdmin = AdminCore;

/// An admin user from the database, with its unique ID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub admin: AdminCore,
}

impl Deref for Admin {
    type Target = AdminCore;

    fn deref(&self) -> &Self::Target {
        &self.admin
    }
}

impl DerefMut for Admin {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.admin
    }
}

/// Ensure the seed admin exists and that its configured password works,
/// creating or repairing it as needed.
///
/// This operation is idempotent.
pub async fn ensure_admin_exists(db: &Database, seed: &SeedAdminConfig) -> Result<()> {
    let admins = Coll::<Admin>::from_db(db);
    let with_username = doc! { "username": &seed.seed_admin_username };
    match admins.find_one(with_username.clone(), None).await? {
        None => {
            let admin = NewAdmin {
                username: seed.seed_admin_username.clone(),
                password_hash: hash_password(&seed.seed_admin_password)?,
                first_name: "Super".to_string(),
                last_name: "Admin".to_string(),
                email: seed.seed_admin_email.clone(),
                role: AdminRole::SuperAdmin,
            };
            Coll::<NewAdmin>::from_db(db)
                .insert_one(&admin, None)
                .await?;
            info!("Created seed admin '{}'", seed.seed_admin_username);
        }
        Some(admin) if !admin.verify_password(&seed.seed_admin_password) => {
            warn!(
                "Seed admin '{}' failed password verification, resetting its password",
                seed.seed_admin_username
            );
            let update = doc! {
                "$set": { "password_hash": hash_password(&seed.seed_admin_password)? }
            };
            admins.update_one(admin.id.as_doc(), update, None).await?;
        }
        Some(_) => debug!("Seed admin '{}' present", seed.seed_admin_username),
    }
    Ok(())
}
