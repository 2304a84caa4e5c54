use log::info;
use mongodb::{
    bson::{doc, Document},
    error::Error as DbError,
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
    api::voter::{VoterLogin, VoterSpec},
    db::{
        candidate::Candidate,
        password::hash_password,
        vote::Vote,
        voter::{NewVoter, Voter},
    },
    mongodb::{Coll, Id},
};

use super::{database_handles, require, OrConflict};

/// Registration, login and management of voters.
pub struct VoterService {
    client: Client,
    voters: Coll<Voter>,
    candidates: Coll<Candidate>,
    votes: Coll<Vote>,
}

impl VoterService {
    pub fn new(client: Client, db: &Database) -> Self {
        Self {
            client,
            voters: Coll::from_db(db),
            candidates: Coll::from_db(db),
            votes: Coll::from_db(db),
        }
    }

    /// All voters, oldest first.
    pub async fn list(&self) -> Result<Vec<Voter>> {
        let by_id = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        let voters = self.voters.find(None, by_id).await?.try_collect().await?;
        Ok(voters)
    }

    pub async fn register(&self, spec: VoterSpec) -> Result<Voter> {
        let spec = check_details(spec)?;
        let password = spec.password.as_deref().unwrap_or_default();
        require("password", password)?;

        let new_voter = NewVoter {
            first_name: spec.first_name,
            last_name: spec.last_name,
            email: spec.email,
            university_id: spec.university_id,
            password_hash: hash_password(password)?,
            approved: true,
        };
        let voter = Voter {
            id: Id::new(),
            voter: new_voter,
        };
        self.voters
            .insert_one(&voter, None)
            .await
            .or_conflict(|| duplicate_voter(&voter.email, &voter.university_id))?;

        info!("Registered voter {}", voter.id);
        Ok(voter)
    }

    /// Find the voter with the given university ID, provided their names and
    /// email also match.
    pub async fn get_by_credentials(&self, login: VoterLogin) -> Result<Voter> {
        let field = |name: &str, value: Option<String>| {
            let value = value.unwrap_or_default();
            require(name, &value).map(|_| value)
        };
        let first_name = field("firstName", login.first_name)?;
        let last_name = field("lastName", login.last_name)?;
        let email = field("email", login.email)?;
        let university_id = field("universityId", login.university_id)?;

        let with_university_id = doc! { "university_id": university_id.trim() };
        self.voters
            .find_one(with_university_id, None)
            .await?
            .filter(|voter| voter.matches_identity(&first_name, &last_name, &email))
            .ok_or_else(|| Error::not_found(Entity::Voter, university_id.trim()))
    }

    pub async fn set_approval(&self, id: Id, approved: bool) -> Result<Voter> {
        let update = doc! { "$set": { "approved": approved } };
        let voter = self.update_one(id, update).await??;
        info!("Set approval of voter {id} to {approved}");
        Ok(voter)
    }

    /// Overwrite a voter's details. The password is only changed if a new one
    /// is given.
    pub async fn update(&self, id: Id, spec: VoterSpec) -> Result<Voter> {
        let spec = check_details(spec)?;
        let mut fields = doc! {
            "first_name": &spec.first_name,
            "last_name": &spec.last_name,
            "email": &spec.email,
            "university_id": &spec.university_id,
        };
        if let Some(password) = spec.password.as_deref().filter(|p| !p.trim().is_empty()) {
            fields.insert("password_hash", hash_password(password)?);
        }

        self.update_one(id, doc! { "$set": fields })
            .await
            .or_conflict(|| duplicate_voter(&spec.email, &spec.university_id))?
    }

    /// Delete a voter along with their votes, their candidacies and any votes
    /// for those candidacies.
    pub async fn delete(&self, id: Id) -> Result<()> {
        if self.voters.count_documents(id.as_doc(), None).await? == 0 {
            return Err(Error::not_found(Entity::Voter, id));
        }

        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;

        let candidacies = self
            .candidates
            .distinct_with_session("_id", doc! { "voter_id": id }, None, &mut session)
            .await?;
        let filter = doc! {
            "$or": [
                { "voter_id": id },
                { "candidate_id": { "$in": candidacies } },
            ]
        };
        let votes = self
            .votes
            .delete_many_with_session(filter, None, &mut session)
            .await?;
        let candidates = self
            .candidates
            .delete_many_with_session(doc! { "voter_id": id }, None, &mut session)
            .await?;
        self.voters
            .delete_one_with_session(id.as_doc(), None, &mut session)
            .await?;

        session.commit_transaction().await?;
        info!(
            "Deleted voter {id} with {} candidacies and {} votes",
            candidates.deleted_count, votes.deleted_count
        );
        Ok(())
    }

    /// Apply an update to one voter, returning the updated voter or `NotFound`.
    async fn update_one(
        &self,
        id: Id,
        update: Document,
    ) -> std::result::Result<Result<Voter>, DbError> {
        let after = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let voter = self
            .voters
            .find_one_and_update(id.as_doc(), update, after)
            .await?;
        Ok(voter.ok_or_else(|| Error::not_found(Entity::Voter, id)))
    }
}

/// Require every identity field and strip surrounding whitespace, so stored
/// details match what login looks up.
fn check_details(spec: VoterSpec) -> Result<VoterSpec> {
    require("firstName", &spec.first_name)?;
    require("lastName", &spec.last_name)?;
    require("email", &spec.email)?;
    require("universityId", &spec.university_id)?;
    Ok(VoterSpec {
        first_name: spec.first_name.trim().to_string(),
        last_name: spec.last_name.trim().to_string(),
        email: spec.email.trim().to_string(),
        university_id: spec.university_id.trim().to_string(),
        password: spec.password,
    })
}

fn duplicate_voter(email: &str, university_id: &str) -> String {
    format!("A voter with email '{email}' or university ID '{university_id}' already exists")
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for VoterService {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let (client, db) = try_outcome!(database_handles(req).await);
        Outcome::Success(Self::new(client, &db))
    }
}
