use std::ops::Deref;

use log::debug;
use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};

use crate::model::db::{
    admin::{Admin, NewAdmin},
    candidate::{Candidate, NewCandidate},
    election::{Election, NewElection},
    vote::{NewVote, Vote},
    voter::{NewVoter, Voter},
};

/// A stored shape, named by the collection it lives in.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Admin collections
const ADMINS: &str = "admins";
impl MongoCollection for Admin {
    const NAME: &'static str = ADMINS;
}
impl MongoCollection for NewAdmin {
    const NAME: &'static str = ADMINS;
}

// Voter collections
const VOTERS: &str = "voters";
impl MongoCollection for Voter {
    const NAME: &'static str = VOTERS;
}
impl MongoCollection for NewVoter {
    const NAME: &'static str = VOTERS;
}

// Election collections
const ELECTIONS: &str = "elections";
impl MongoCollection for Election {
    const NAME: &'static str = ELECTIONS;
}
impl MongoCollection for NewElection {
    const NAME: &'static str = ELECTIONS;
}

// Candidate collections
const CANDIDATES: &str = "candidates";
impl MongoCollection for Candidate {
    const NAME: &'static str = CANDIDATES;
}
impl MongoCollection for NewCandidate {
    const NAME: &'static str = CANDIDATES;
}

// Vote collections
const VOTES: &str = "votes";
impl MongoCollection for Vote {
    const NAME: &'static str = VOTES;
}
impl MongoCollection for NewVote {
    const NAME: &'static str = VOTES;
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // Voter collection.
    let voter_indexes = [
        IndexModel::builder()
            .keys(doc! {"email": 1})
            .options(unique.clone())
            .build(),
        IndexModel::builder()
            .keys(doc! {"university_id": 1})
            .options(unique.clone())
            .build(),
    ];
    Coll::<Voter>::from_db(db)
        .create_indexes(voter_indexes, None)
        .await?;

    // Admin collection.
    let admin_indexes = [
        IndexModel::builder()
            .keys(doc! {"username": 1})
            .options(unique.clone())
            .build(),
        IndexModel::builder()
            .keys(doc! {"email": 1})
            .options(unique.clone())
            .build(),
    ];
    Coll::<Admin>::from_db(db)
        .create_indexes(admin_indexes, None)
        .await?;

    // Candidate collection.
    let candidate_index = IndexModel::builder()
        .keys(doc! {"election_id": 1, "voter_id": 1})
        .build();
    Coll::<Candidate>::from_db(db)
        .create_index(candidate_index, None)
        .await?;

    // Vote collection. One vote per voter per post per election.
    let vote_indexes = [
        IndexModel::builder()
            .keys(doc! {"voter_id": 1, "election_id": 1, "post": 1})
            .options(unique)
            .build(),
        IndexModel::builder().keys(doc! {"candidate_id": 1}).build(),
    ];
    Coll::<Vote>::from_db(db)
        .create_indexes(vote_indexes, None)
        .await?;

    Ok(())
}
