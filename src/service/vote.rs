use chrono::Utc;
use log::info;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    options::FindOptions,
    Client, Database,
};
use rocket::{
    futures::TryStreamExt,
    outcome::try_outcome,
    request::{FromRequest, Outcome, Request},
    State,
};

use crate::config::Config;
use crate::error::{Entity, Error, Result};
use crate::model::{
    api::vote::VoteRequest,
    common::election::ElectionStatus,
    db::{
        candidate::Candidate,
        election::Election,
        vote::{NewVote, Tally, Vote, VoteCore},
        voter::Voter,
    },
    mongodb::{Coll, Id},
};

use super::{database_handles, OrConflict};

/// Casting, removing and counting votes.
pub struct VoteService {
    client: Client,
    votes: Coll<Vote>,
    voters: Coll<Voter>,
    candidates: Coll<Candidate>,
    elections: Coll<Election>,
    require_active_election: bool,
}

impl VoteService {
    pub fn new(client: Client, db: &Database, require_active_election: bool) -> Self {
        Self {
            client,
            votes: Coll::from_db(db),
            voters: Coll::from_db(db),
            candidates: Coll::from_db(db),
            elections: Coll::from_db(db),
            require_active_election,
        }
    }

    pub async fn list(&self) -> Result<Vec<Vote>> {
        let by_id = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let votes = self.votes.find(None, by_id).await?.try_collect().await?;
        Ok(votes)
    }

    pub async fn get(&self, id: Id) -> Result<Vote> {
        self.votes
            .find_one(id.as_doc(), None)
            .await?
            .ok_or_else(|| Error::not_found(Entity::Vote, id))
    }

    /// Cast a vote for a candidate. A voter gets one vote per post in each
    /// election.
    pub async fn cast(&self, request: VoteRequest) -> Result<Vote> {
        let voter_id = request
            .voter_id
            .ok_or_else(|| Error::Validation("'voterId' is required".to_string()))?;
        let candidate_id = request
            .candidate_id
            .ok_or_else(|| Error::Validation("'candidateId' is required".to_string()))?;

        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        // Stamping the voter and candidate makes a concurrent delete of either
        // one conflict with this transaction instead of orphaning the vote.
        let raced = || "Voter or candidate changed while the vote was being cast".to_string();
        let touch = doc! { "$set": { "last_vote_at": BsonDateTime::now() } };
        self.voters
            .find_one_and_update_with_session(voter_id.as_doc(), touch.clone(), None, &mut session)
            .await
            .or_conflict(raced)?
            .ok_or_else(|| Error::not_found(Entity::Voter, voter_id))?;
        let candidate = self
            .candidates
            .find_one_and_update_with_session(candidate_id.as_doc(), touch, None, &mut session)
            .await
            .or_conflict(raced)?
            .ok_or_else(|| Error::not_found(Entity::Candidate, candidate_id))?;
        let election = self
            .elections
            .find_one_with_session(Election::live_with_id(candidate.election_id), None, &mut session)
            .await?
            .ok_or_else(|| Error::not_found(Entity::Election, candidate.election_id))?;

        let post = candidate.candidate.post;
        if post.trim().is_empty() {
            return Err(Error::Validation(format!(
                "Candidate {candidate_id} is not standing for any position"
            )));
        }
        if self.require_active_election && election.status != ElectionStatus::Active {
            return Err(Error::Validation(format!(
                "Election {} is {}, votes are only accepted while it is active",
                election.id, election.status
            )));
        }

        let already_voted = || {
            format!("Voter has already voted for the position '{post}' in this election")
        };
        let existing = VoteCore::post_filter(voter_id, election.id, &post);
        if self
            .votes
            .count_documents_with_session(existing, None, &mut session)
            .await?
            > 0
        {
            return Err(Error::Conflict(already_voted()));
        }

        let new_vote = NewVote {
            voter_id,
            candidate_id,
            election_id: election.id,
            post: post.clone(),
            timestamp: Utc::now(),
        };
        let vote = Vote {
            id: Id::new(),
            vote: new_vote,
        };
        self.votes
            .insert_one_with_session(&vote, None, &mut session)
            .await
            .or_conflict(already_voted)?;
        session.commit_transaction().await.or_conflict(raced)?;

        info!(
            "Voter {voter_id} voted for candidate {candidate_id} as '{post}' in election {}",
            election.id
        );
        self.get(vote.id).await
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        let result = self.votes.delete_one(id.as_doc(), None).await?;
        if result.deleted_count == 0 {
            return Err(Error::not_found(Entity::Vote, id));
        }
        info!("Deleted vote {id}");
        Ok(())
    }

    /// Votes per candidate per post in an election, ordered by post then by
    /// descending vote count.
    pub async fn count_by_election(&self, election_id: Id) -> Result<Vec<Tally>> {
        let live = Election::live_with_id(election_id);
        if self.elections.count_documents(live, None).await? == 0 {
            return Err(Error::not_found(Entity::Election, election_id));
        }

        let tallies = self
            .votes
            .aggregate(Tally::pipeline(election_id), None)
            .await?
            .with_type::<Tally>()
            .try_collect()
            .await?;
        Ok(tallies)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for VoteService {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let (client, db) = try_outcome!(database_handles(req).await);
        let config = try_outcome!(req.guard::<&State<Config>>().await);
        Outcome::Success(Self::new(client, &db, config.require_active_election()))
    }
}
