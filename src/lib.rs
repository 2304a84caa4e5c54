#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing};
use crate::logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod service;

/// Assemble the server: routes, error catchers and the fairings that load
/// config and connect to the database.
pub fn build() -> Rocket<Build> {
    with_fairings(rocket::build(), DatabaseFairing::default())
}

fn with_fairings(rocket: Rocket<Build>, database: DatabaseFairing) -> Rocket<Build> {
    rocket
        .mount(api::API_BASE, api::routes())
        .register("/", api::catchers())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(database)
}

/// A server connected to the named database rather than the configured one.
#[cfg(test)]
pub(crate) fn rocket_for_db(db_name: &str) -> Rocket<Build> {
    with_fairings(rocket::build(), DatabaseFairing::with_db_name(db_name))
}

/// A fresh database name, so tests don't interfere with each other.
#[cfg(test)]
pub(crate) fn test_database_name() -> String {
    format!("test{}", rand::random::<u32>())
}
