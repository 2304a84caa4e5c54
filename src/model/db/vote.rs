use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use mongodb::bson::{doc, serde_helpers::chrono_datetime_as_bson_datetime, Document};
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core vote data, as stored in the database.
///
/// The election and post are copied from the candidate at casting time so
/// that the unique index on `(voter_id, election_id, post)` can enforce one
/// vote per voter per post per election.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct VoteCore {
    pub voter_id: Id,
    pub candidate_id: Id,
    pub election_id: Id,
    pub post: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl VoteCore {
    /// Filter matching any vote by this voter for this post in this election.
    pub fn post_filter(voter_id: Id, election_id: Id, post: &str) -> Document {
        doc! {
            "voter_id": voter_id,
            "election_id": election_id,
            "post": post,
        }
    }
}

/// A vote without an ID.
pub type NewVote = VoteCore;

/// A vote from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub vote: VoteCore,
}

impl Deref for Vote {
    type Target = VoteCore;

    fn deref(&self) -> &Self::Target {
        &self.vote
    }
}

impl DerefMut for Vote {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.vote
    }
}

/// One row of an election tally: the votes received by one candidate for one post.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct Tally {
    #[serde(rename = "_id")]
    pub key: TallyKey,
    pub votes: u64,
}

#[derive(Debug, PartialEq, Eq, Clone, Deserialize)]
pub struct TallyKey {
    pub post: String,
    pub candidate_id: Id,
}

impl Tally {
    /// Aggregation pipeline counting the votes in an election grouped by
    /// post and candidate, ordered by post then by descending vote count.
    pub fn pipeline(election_id: Id) -> Vec<Document> {
        vec![
            doc! { "$match": { "election_id": election_id } },
            doc! {
                "$group": {
                    "_id": { "post": "$post", "candidate_id": "$candidate_id" },
                    "votes": { "$sum": 1 },
                }
            },
            doc! { "$sort": { "_id.post": 1, "votes": -1, "_id.candidate_id": 1 } },
        ]
    }
}
