use rocket::{response::status::Created, serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::{
        auth::AuthToken,
        vote::{TallyDescription, VoteDescription, VoteRequest},
    },
    db::voter::Voter,
    mongodb::Id,
};
use crate::service::VoteService;

pub fn routes() -> Vec<Route> {
    routes![get_votes, get_vote, count_votes, cast_vote, delete_vote]
}

#[get("/votes")]
async fn get_votes(votes: VoteService) -> Result<Json<Vec<VoteDescription>>> {
    let votes = votes.list().await?;
    Ok(Json(votes.into_iter().map(Into::into).collect()))
}

#[get("/votes/<vote_id>")]
async fn get_vote(vote_id: Id, votes: VoteService) -> Result<Json<VoteDescription>> {
    Ok(Json(votes.get(vote_id).await?.into()))
}

#[get("/votes/election/<election_id>/count")]
async fn count_votes(
    election_id: Id,
    votes: VoteService,
) -> Result<Json<Vec<TallyDescription>>> {
    let tallies = votes.count_by_election(election_id).await?;
    Ok(Json(tallies.into_iter().map(Into::into).collect()))
}

/// Cast a vote. A logged-in voter may only vote as themselves.
#[post("/votes", data = "<request>", format = "json")]
async fn cast_vote(
    token: Option<AuthToken<Voter>>,
    request: Json<VoteRequest>,
    votes: VoteService,
) -> Result<Created<Json<VoteDescription>>> {
    if let Some(token) = token {
        if request.voter_id != Some(token.id) {
            return Err(Error::Unauthorized(
                "Voters may only cast their own votes".to_string(),
            ));
        }
    }

    let vote = votes.cast(request.0).await?;
    let location = uri!("/api/v1", get_vote(vote.id)).to_string();
    Ok(Created::new(location).body(Json(vote.into())))
}

#[delete("/votes/<vote_id>")]
async fn delete_vote(vote_id: Id, votes: VoteService) -> Result<()> {
    votes.delete(vote_id).await
}
