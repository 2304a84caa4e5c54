//! Domain services. Each service is a request guard over the shared database
//! handles and enforces the business rules for one kind of entity.

use mongodb::{error::Error as DbError, Client, Database};
use rocket::{
    outcome::try_outcome,
    request::{Outcome, Request},
    State,
};

use crate::error::{Error, Result};
use crate::model::mongodb::{is_duplicate_key_error, is_write_conflict};

mod admin;
mod candidate;
mod election;
mod vote;
mod voter;

pub use admin::AdminService;
pub use candidate::CandidateService;
pub use election::ElectionService;
pub use vote::VoteService;
pub use voter::VoterService;

/// Fetch the managed database handles for a service guard.
async fn database_handles(req: &Request<'_>) -> Outcome<(Client, Database), ()> {
    let client = try_outcome!(req.guard::<&State<Client>>().await);
    let db = try_outcome!(req.guard::<&State<Database>>().await);
    Outcome::Success((client.inner().clone(), db.inner().clone()))
}

/// Turn a duplicate key failure from a unique index, or a transaction that lost
/// a race for the same document, into a [`Error::Conflict`].
trait OrConflict<T> {
    fn or_conflict(self, message: impl FnOnce() -> String) -> Result<T>;
}

impl<T> OrConflict<T> for std::result::Result<T, DbError> {
    fn or_conflict(self, message: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|err| {
            if is_duplicate_key_error(&err) || is_write_conflict(&err) {
                Error::Conflict(message())
            } else {
                err.into()
            }
        })
    }
}

/// Reject a required text field that is blank.
fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::Validation(format!("'{field}' must not be blank")))
    } else {
        Ok(())
    }
}
