use chrono::Duration;
use log::{error, info};
use mongodb::{Client as MongoClient, Database};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    api::admin::AdminLogin,
    db::admin::ensure_admin_exists,
    mongodb::ensure_indexes_exist,
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    #[serde(default = "default_require_active_election")]
    require_active_election: bool,
    // secrets
    jwt_secret: String,
}

fn default_require_active_election() -> bool {
    true
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to encrypt JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Whether votes may only be cast while their election is `active`.
    pub fn require_active_election(&self) -> bool {
        self.require_active_election
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // non-secrets
    db_name: String,
    // secrets
    db_uri: String,
}

/// The admin account that must always exist, created or repaired at startup.
#[derive(Clone, Deserialize)]
pub struct SeedAdminConfig {
    pub seed_admin_username: String,
    pub seed_admin_email: String,
    // secrets
    pub seed_admin_password: String,
}

impl SeedAdminConfig {
    /// The login credentials of the seed admin.
    pub fn credentials(&self) -> AdminLogin {
        AdminLogin {
            username: self.seed_admin_username.clone(),
            password: self.seed_admin_password.clone(),
        }
    }
}

/// A fairing that loads the MongoDB config, connects to the database,
/// performs any setup necessary, and places both a `Client` and a `Database`
/// into managed state.
#[derive(Default)]
pub struct DatabaseFairing {
    /// Use this database instead of the configured `db_name`.
    db_name: Option<String>,
}

impl DatabaseFairing {
    /// Connect to the named database rather than the configured one.
    pub fn with_db_name(db_name: impl Into<String>) -> Self {
        Self {
            db_name: Some(db_name.into()),
        }
    }
}

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let figment = rocket.figment();
        let configs = figment
            .extract::<DbConfig>()
            .and_then(|db| Ok((db, figment.extract::<SeedAdminConfig>()?)));
        let (config, seed) = match configs {
            Ok(configs) => configs,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        // Construct the connection.
        let client = match MongoClient::with_uri_str(config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db_name = self.db_name.as_deref().unwrap_or(&config.db_name);
        let db = client.database(db_name);

        if let Err(e) = migrate(&db, &seed).await {
            error!("Failed to prepare database {db_name}: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        rocket = rocket.manage(client).manage(db);
        Ok(rocket)
    }
}

/// Bring a database up to date: indexes first, then the seed admin.
///
/// This operation is idempotent.
async fn migrate(db: &Database, seed: &SeedAdminConfig) -> crate::error::Result<()> {
    ensure_indexes_exist(db).await?;
    ensure_admin_exists(db, seed).await
}
