use log::{info, warn};
use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Database,
};
use rocket::{
    futures::TryStreamExt,
    outcome::try_outcome,
    request::{FromRequest, Outcome, Request},
};

use crate::error::{Entity, Error, Result};
use crate::model::{
    api::admin::{AdminLogin, AdminSpec},
    db::{
        admin::{Admin, NewAdmin},
        password::hash_password,
    },
    mongodb::{Coll, Id},
};

use super::{database_handles, require, OrConflict};

/// Login and management of admin accounts.
pub struct AdminService {
    admins: Coll<Admin>,
}

impl AdminService {
    pub fn new(db: &Database) -> Self {
        Self {
            admins: Coll::from_db(db),
        }
    }

    pub async fn list(&self) -> Result<Vec<Admin>> {
        let by_id = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let admins = self.admins.find(None, by_id).await?.try_collect().await?;
        Ok(admins)
    }

    pub async fn get(&self, id: Id) -> Result<Admin> {
        self.admins
            .find_one(id.as_doc(), None)
            .await?
            .ok_or_else(|| Error::not_found(Entity::Admin, id))
    }

    pub async fn create(&self, spec: AdminSpec) -> Result<Admin> {
        require("username", &spec.username)?;
        let password = spec.password.as_deref().unwrap_or_default();
        require("password", password)?;

        let new_admin = NewAdmin {
            password_hash: hash_password(password)?,
            username: spec.username,
            first_name: spec.first_name,
            last_name: spec.last_name,
            email: spec.email,
            role: spec.role,
        };
        let admin = Admin {
            id: Id::new(),
            admin: new_admin,
        };
        self.admins
            .insert_one(&admin, None)
            .await
            .or_conflict(|| duplicate_admin(&admin.username, &admin.email))?;

        info!("Created admin '{}' ({})", admin.username, admin.id);
        Ok(admin)
    }

    /// Find the admin with the given username, provided the password matches.
    pub async fn get_by_credentials(&self, login: AdminLogin) -> Result<Admin> {
        require("username", &login.username)?;
        require("password", &login.password)?;

        let with_username = doc! { "username": &login.username };
        match self.admins.find_one(with_username, None).await? {
            Some(admin) if admin.verify_password(&login.password) => Ok(admin),
            _ => {
                warn!("Failed admin login as '{}'", login.username);
                Err(Error::Unauthorized(
                    "Invalid username or password".to_string(),
                ))
            }
        }
    }

    /// Overwrite an admin's details. The password is only changed if a new
    /// one is given.
    pub async fn update(&self, id: Id, spec: AdminSpec) -> Result<Admin> {
        require("username", &spec.username)?;
        let mut fields = doc! {
            "username": &spec.username,
            "first_name": &spec.first_name,
            "last_name": &spec.last_name,
            "email": &spec.email,
            "role": spec.role,
        };
        if let Some(password) = spec.password.as_deref().filter(|p| !p.trim().is_empty()) {
            fields.insert("password_hash", hash_password(password)?);
        }

        let after = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.admins
            .find_one_and_update(id.as_doc(), doc! { "$set": fields }, after)
            .await
            .or_conflict(|| duplicate_admin(&spec.username, &spec.email))?
            .ok_or_else(|| Error::not_found(Entity::Admin, id))
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        let result = self.admins.delete_one(id.as_doc(), None).await?;
        if result.deleted_count == 0 {
            return Err(Error::not_found(Entity::Admin, id));
        }
        info!("Deleted admin {id}");
        Ok(())
    }
}

fn duplicate_admin(username: &str, email: &str) -> String {
    format!("An admin with username '{username}' or email '{email}' already exists")
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminService {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let (_, db) = try_outcome!(database_handles(req).await);
        Outcome::Success(Self::new(&db))
    }
}
