use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{api::id::ApiId, db::candidate::Candidate, mongodb::Id};

/// A candidacy as submitted for creation or update.
///
/// On creation the voter and election are required. On update they are
/// optional and, when present, move the candidacy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub election_id: Option<Id>,
    #[serde(default)]
    pub post: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub approved: bool,
}

/// A candidate as returned by the API.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateDescription {
    pub id: ApiId,
    pub voter_id: ApiId,
    pub election_id: ApiId,
    pub post: String,
    pub bio: String,
    pub approved: bool,
    pub date_registered: DateTime<Utc>,
}

impl From<Candidate> for CandidateDescription {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id.into(),
            voter_id: candidate.candidate.voter_id.into(),
            election_id: candidate.candidate.election_id.into(),
            post: candidate.candidate.post,
            bio: candidate.candidate.bio,
            approved: candidate.candidate.approved,
            date_registered: candidate.candidate.date_registered,
        }
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl CandidateSpec {
        pub fn example(voter_id: Id, election_id: Id, post: &str) -> Self {
            Self {
                voter_id: Some(voter_id),
                election_id: Some(election_id),
                post: post.to_string(),
                bio: format!("Running for {post}"),
                approved: false,
            }
        }
    }
}
