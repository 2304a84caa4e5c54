use log::info;
use mongodb::{
    bson::{doc, Document},
    options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument},
    Client, Database,
};
use rocket::{
    futures::TryStreamExt,
    outcome::try_outcome,
    request::{FromRequest, Outcome, Request},
};

use crate::error::{Entity, Error, Result};
use crate::model::{
    api::election::ElectionSpec,
    common::election::ElectionStatus,
    db::{
        candidate::Candidate,
        election::{Election, NewElection},
        vote::Vote,
    },
    mongodb::{Coll, Id},
};

use super::{database_handles, require};

/// Creation, lifecycle and deletion of elections.
pub struct ElectionService {
    client: Client,
    elections: Coll<Election>,
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
}

impl ElectionService {
    pub fn new(client: Client, db: &Database) -> Self {
        Self {
            client,
            elections: Coll::from_db(db),
            candidates: Coll::from_db(db),
            votes: Coll::from_db(db),
        }
    }

    /// All elections that have not been deleted.
    pub async fn list(&self) -> Result<Vec<Election>> {
        let by_id = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let elections = self
            .elections
            .find(Election::live(), by_id)
            .await?
            .try_collect()
            .await?;
        Ok(elections)
    }

    pub async fn get(&self, id: Id) -> Result<Election> {
        self.elections
            .find_one(Election::live_with_id(id), None)
            .await?
            .ok_or_else(|| Error::not_found(Entity::Election, id))
    }

    /// Create an election, as a draft unless another status is given.
    pub async fn create(&self, spec: ElectionSpec) -> Result<Election> {
        require("name", &spec.name)?;
        let status = match spec.status.as_deref() {
            Some(status) => ElectionStatus::parse_lenient(status)?,
            None => ElectionStatus::default(),
        };

        let new_election = NewElection {
            name: spec.name,
            description: spec.description,
            start_time: spec.start_time,
            end_time: spec.end_time,
            status,
            deleted: false,
        };
        let election = Election {
            id: Id::new(),
            election: new_election,
        };
        self.elections.insert_one(&election, None).await?;
        info!("Created election {} ({})", election.id, election.status);

        // Read back, as the database truncates the times.
        self.get(election.id).await
    }

    pub async fn update_status(&self, id: Id, status: &str) -> Result<Election> {
        let election = self.get(id).await?;
        let next = election
            .status
            .transition(ElectionStatus::parse_lenient(status)?)?;

        let election = self.update_one(id, doc! { "$set": { "status": next } }).await?;
        info!("Election {id} is now {next}");
        Ok(election)
    }

    /// Overwrite an election's details. Any status change must be a legal
    /// transition.
    pub async fn update(&self, id: Id, spec: ElectionSpec) -> Result<Election> {
        require("name", &spec.name)?;
        let election = self.get(id).await?;
        let next = match spec.status.as_deref() {
            Some(status) => election
                .status
                .transition(ElectionStatus::parse_lenient(status)?)?,
            None => election.status,
        };

        let update = doc! {
            "$set": {
                "name": spec.name,
                "description": spec.description,
                "start_time": spec.start_time,
                "end_time": spec.end_time,
                "status": next,
            }
        };
        self.update_one(id, update).await
    }

    /// Soft-delete an election, hard-deleting all of its candidates and their
    /// votes. Either everything is removed or nothing is.
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.get(id).await?;

        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let candidate_ids = self
            .candidates
            .distinct_with_session("_id", doc! { "election_id": id }, None, &mut session)
            .await?;
        let votes = self
            .votes
            .delete_many_with_session(
                doc! { "candidate_id": { "$in": candidate_ids } },
                None,
                &mut session,
            )
            .await?;
        let candidates = self
            .candidates
            .delete_many_with_session(doc! { "election_id": id }, None, &mut session)
            .await?;
        self.elections
            .update_one_with_session(
                id.as_doc(),
                doc! { "$set": { "deleted": true } },
                None,
                &mut session,
            )
            .await?;

        session.commit_transaction().await?;
        info!(
            "Deleted election {id} with {} candidates and {} votes",
            candidates.deleted_count, votes.deleted_count
        );
        Ok(())
    }

    async fn update_one(&self, id: Id, update: Document) -> Result<Election> {
        let after = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.elections
            .find_one_and_update(Election::live_with_id(id), update, after)
            .await?
            .ok_or_else(|| Error::not_found(Entity::Election, id))
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ElectionService {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let (client, db) = try_outcome!(database_handles(req).await);
        Outcome::Success(Self::new(client, &db))
    }
}
