use std::fmt::{Display, Formatter};

use argon2::Error as Argon2Error;
use jsonwebtoken::errors::Error as JwtError;
use log::{error, warn};
use mongodb::error::Error as DbError;
use rocket::{
    http::Status,
    response::{status::Custom, Responder},
    serde::json::Json,
    Request,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::RequestId;

pub type Result<T> = std::result::Result<T, Error>;

/// The kinds of stored entity, used to give errors structured context.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Entity {
    Admin,
    Voter,
    Election,
    Candidate,
    Vote,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Admin => "Admin",
            Self::Voter => "Voter",
            Self::Election => "Election",
            Self::Candidate => "Candidate",
            Self::Vote => "Vote",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: Entity, id: String },
    #[error("{0}")]
    Conflict(String),
}

impl Error {
    pub fn not_found(entity: Entity, id: impl Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// The HTTP status this error maps to.
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::Unauthorized(_) => Status::Unauthorized,
            Self::NotFound { .. } => Status::NotFound,
            Self::Conflict(_) => Status::Conflict,
            Self::Db(_) | Self::Jwt(_) | Self::Argon2(_) => Status::InternalServerError,
        }
    }

    /// A short machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Unauthorized(_) => "unauthorized",
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Db(_) | Self::Jwt(_) | Self::Argon2(_) => "unexpected",
        }
    }
}

/// The JSON body sent alongside any error status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        let id = RequestId::of(req);
        if status.code >= 500 {
            error!("req{id} failed: {self}");
        } else {
            warn!("req{id} rejected: {self}");
        }
        let body = ErrorBody::new(self.kind(), self.to_string());
        Custom(status, Json(body)).respond_to(req)
    }
}
