use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    api::id::ApiId,
    db::vote::{Tally, Vote},
    mongodb::Id,
};

/// A ballot as submitted by a voter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(default)]
    pub voter_id: Option<Id>,
    #[serde(default)]
    pub candidate_id: Option<Id>,
}

/// A vote as returned by the API.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteDescription {
    pub id: ApiId,
    pub voter_id: ApiId,
    pub candidate_id: ApiId,
    pub election_id: ApiId,
    pub post: String,
    pub timestamp: DateTime<Utc>,
}

impl From<Vote> for VoteDescription {
    fn from(vote: Vote) -> Self {
        Self {
            id: vote.id.into(),
            voter_id: vote.vote.voter_id.into(),
            candidate_id: vote.vote.candidate_id.into(),
            election_id: vote.vote.election_id.into(),
            post: vote.vote.post,
            timestamp: vote.vote.timestamp,
        }
    }
}

/// The number of votes one candidate received for one post.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyDescription {
    pub post: String,
    pub candidate_id: ApiId,
    pub votes: u64,
}

impl From<Tally> for TallyDescription {
    fn from(tally: Tally) -> Self {
        Self {
            post: tally.key.post,
            candidate_id: tally.key.candidate_id.into(),
            votes: tally.votes,
        }
    }
}
