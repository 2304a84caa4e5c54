use serde::{Deserialize, Serialize};

use crate::model::{api::id::ApiId, db::voter::Voter};

/// A voter's details as submitted for registration or update.
///
/// The password is plaintext. Registration requires it; an update may omit it
/// or leave it blank to keep the current one.
#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterSpec {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub university_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// The identity fields a voter logs in with.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterLogin {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub university_id: Option<String>,
}

/// A voter as returned by the API.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterDescription {
    pub id: ApiId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub university_id: String,
    pub approved: bool,
}

impl From<Voter> for VoterDescription {
    fn from(voter: Voter) -> Self {
        Self {
            id: voter.id.into(),
            first_name: voter.voter.first_name,
            last_name: voter.voter.last_name,
            email: voter.voter.email,
            university_id: voter.voter.university_id,
            approved: voter.voter.approved,
        }
    }
}
