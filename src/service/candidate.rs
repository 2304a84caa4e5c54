use chrono::Utc;
use log::{info, warn};
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
    api::candidate::CandidateSpec,
    db::{
        candidate::{Candidate, NewCandidate},
        election::Election,
        vote::Vote,
        voter::Voter,
    },
    mongodb::{Coll, Id},
};

use super::{database_handles, require, OrConflict};

/// Registration and management of candidacies.
pub struct CandidateService {
    client: Client,
    candidates: Coll<Candidate>,
    voters: Coll<Voter>,
    elections: Coll<Election>,
    votes: Coll<Vote>,
}

impl CandidateService {
    pub fn new(client: Client, db: &Database) -> Self {
        Self {
            client,
            candidates: Coll::from_db(db),
            voters: Coll::from_db(db),
            elections: Coll::from_db(db),
            votes: Coll::from_db(db),
        }
    }

    pub async fn list(&self) -> Result<Vec<Candidate>> {
        self.find(None).await
    }

    pub async fn get(&self, id: Id) -> Result<Candidate> {
        self.candidates
            .find_one(id.as_doc(), None)
            .await?
            .ok_or_else(|| Error::not_found(Entity::Candidate, id))
    }

    pub async fn list_by_election(&self, election_id: Id) -> Result<Vec<Candidate>> {
        self.find(Some(doc! { "election_id": election_id })).await
    }

    /// Register a voter as a candidate for a post in an election. New
    /// candidates start unapproved.
    pub async fn add(&self, spec: CandidateSpec) -> Result<Candidate> {
        let voter_id = spec
            .voter_id
            .ok_or_else(|| Error::Validation("'voterId' is required".to_string()))?;
        let election_id = spec
            .election_id
            .ok_or_else(|| Error::Validation("'electionId' is required".to_string()))?;
        self.check_voter(voter_id).await?;
        self.check_election(election_id).await?;
        require("post", &spec.post)?;

        let already_standing = doc! { "voter_id": voter_id, "election_id": election_id };
        if self.candidates.count_documents(already_standing, None).await? > 0 {
            warn!("Voter {voter_id} is already a candidate in election {election_id}");
        }

        let new_candidate = NewCandidate {
            voter_id,
            election_id,
            post: spec.post,
            bio: spec.bio,
            approved: false,
            date_registered: Utc::now(),
        };
        let candidate = Candidate {
            id: Id::new(),
            candidate: new_candidate,
        };
        self.candidates.insert_one(&candidate, None).await?;

        info!(
            "Voter {voter_id} is standing for '{}' in election {election_id} as candidate {}",
            candidate.post, candidate.id
        );
        self.get(candidate.id).await
    }

    /// Overwrite a candidate's post, bio and approval, and optionally move it
    /// to another voter or election. Votes already cast for the candidate
    /// follow its post and election.
    pub async fn update(&self, id: Id, spec: CandidateSpec) -> Result<Candidate> {
        let candidate = self.get(id).await?;
        require("post", &spec.post)?;
        let voter_id = match spec.voter_id {
            Some(voter_id) => self.check_voter(voter_id).await?,
            None => candidate.voter_id,
        };
        let election_id = match spec.election_id {
            Some(election_id) => self.check_election(election_id).await?,
            None => candidate.election_id,
        };

        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let update = doc! {
            "$set": {
                "voter_id": voter_id,
                "election_id": election_id,
                "post": &spec.post,
                "bio": &spec.bio,
                "approved": spec.approved,
            }
        };
        let after = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .candidates
            .find_one_and_update_with_session(id.as_doc(), update, after, &mut session)
            .await?
            .ok_or_else(|| Error::not_found(Entity::Candidate, id))?;

        if updated.post != candidate.post || updated.election_id != candidate.election_id {
            let sync = doc! {
                "$set": { "election_id": election_id, "post": &spec.post }
            };
            self.votes
                .update_many_with_session(doc! { "candidate_id": id }, sync, None, &mut session)
                .await
                .or_conflict(|| {
                    format!(
                        "A voter for candidate {id} has already voted for the position '{}' in this election",
                        spec.post
                    )
                })?;
        }

        session.commit_transaction().await?;
        Ok(updated)
    }

    /// Delete a candidate and every vote cast for it.
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.get(id).await?;

        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let raced = || format!("Candidate {id} received a vote while being deleted");
        let votes = self
            .votes
            .delete_many_with_session(doc! { "candidate_id": id }, None, &mut session)
            .await
            .or_conflict(raced)?;
        self.candidates
            .delete_one_with_session(id.as_doc(), None, &mut session)
            .await
            .or_conflict(raced)?;

        session.commit_transaction().await.or_conflict(raced)?;
        info!("Deleted candidate {id} with {} votes", votes.deleted_count);
        Ok(())
    }

    async fn find(&self, filter: Option<Document>) -> Result<Vec<Candidate>> {
        let by_id = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let candidates = self
            .candidates
            .find(filter, by_id)
            .await?
            .try_collect()
            .await?;
        Ok(candidates)
    }

    async fn check_voter(&self, voter_id: Id) -> Result<Id> {
        if self.voters.count_documents(voter_id.as_doc(), None).await? == 0 {
            return Err(Error::not_found(Entity::Voter, voter_id));
        }
        Ok(voter_id)
    }

    async fn check_election(&self, election_id: Id) -> Result<Id> {
        let live = Election::live_with_id(election_id);
        if self.elections.count_documents(live, None).await? == 0 {
            return Err(Error::not_found(Entity::Election, election_id));
        }
        Ok(election_id)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CandidateService {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let (client, db) = try_outcome!(database_handles(req).await);
        Outcome::Success(Self::new(client, &db))
    }
}
