use rocket::{response::status::Created, serde::json::Json, Route};

use crate::error::Result;
use crate::model::{
    api::candidate::{CandidateDescription, CandidateSpec},
    mongodb::Id,
};
use crate::service::CandidateService;

pub fn routes() -> Vec<Route> {
    routes![
        get_candidates,
        get_candidate,
        get_election_candidates,
        add_candidate,
        update_candidate,
        delete_candidate,
    ]
}

#[get("/candidates")]
async fn get_candidates(candidates: CandidateService) -> Result<Json<Vec<CandidateDescription>>> {
    let candidates = candidates.list().await?;
    Ok(Json(candidates.into_iter().map(Into::into).collect()))
}

#[get("/candidates/<candidate_id>")]
async fn get_candidate(
    candidate_id: Id,
    candidates: CandidateService,
) -> Result<Json<CandidateDescription>> {
    Ok(Json(candidates.get(candidate_id).await?.into()))
}

#[get("/candidates/election/<election_id>")]
async fn get_election_candidates(
    election_id: Id,
    candidates: CandidateService,
) -> Result<Json<Vec<CandidateDescription>>> {
    let candidates = candidates.list_by_election(election_id).await?;
    Ok(Json(candidates.into_iter().map(Into::into).collect()))
}

#[post("/candidates", data = "<spec>", format = "json")]
async fn add_candidate(
    spec: Json<CandidateSpec>,
    candidates: CandidateService,
) -> Result<Created<Json<CandidateDescription>>> {
    let candidate = candidates.add(spec.0).await?;
    let location = uri!("/api/v1", get_candidate(candidate.id)).to_string();
    Ok(Created::new(location).body(Json(candidate.into())))
}

#[put("/candidates/<candidate_id>", data = "<spec>", format = "json")]
async fn update_candidate(
    candidate_id: Id,
    spec: Json<CandidateSpec>,
    candidates: CandidateService,
) -> Result<Json<CandidateDescription>> {
    Ok(Json(candidates.update(candidate_id, spec.0).await?.into()))
}

#[delete("/candidates/<candidate_id>")]
async fn delete_candidate(candidate_id: Id, candidates: CandidateService) -> Result<()> {
    candidates.delete(candidate_id).await
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json::{json, Value},
    };

    use crate::api::testing::{self, create_election, post, register_voter};
    use crate::error::ErrorBody;
    use crate::model::{
        api::{election::ElectionSpec, vote::VoteRequest, voter::VoterSpec},
        db::vote::Vote,
        mongodb::Coll,
    };

    use super::*;

    #[backend_test]
    async fn add_and_list(client: Client) {
        let first = create_election(&client, &ElectionSpec::current_example()).await;
        let second = create_election(&client, &ElectionSpec::current_example()).await;
        let voter = register_voter(&client, &VoterSpec::example1()).await;

        let president = testing::add_candidate(&client, *voter.id, *first.id, "President").await;
        assert!(!president.approved);
        assert_eq!(president.post, "President");
        let other = testing::add_candidate(&client, *voter.id, *second.id, "Secretary").await;

        let response = client
            .get(uri!("/api/v1", get_candidate(*president.id)))
            .dispatch()
            .await;
        let fetched: CandidateDescription = response.into_json().await.unwrap();
        assert_eq!(fetched, president);

        let response = client
            .get(uri!("/api/v1", get_election_candidates(*first.id)))
            .dispatch()
            .await;
        let in_first: Vec<CandidateDescription> = response.into_json().await.unwrap();
        assert_eq!(in_first, vec![president]);

        let response = client.get(uri!("/api/v1", get_candidates)).dispatch().await;
        let all: Vec<CandidateDescription> = response.into_json().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1], other);
    }

    #[backend_test]
    async fn add_checks_references(client: Client) {
        let election = create_election(&client, &ElectionSpec::current_example()).await;
        let voter = register_voter(&client, &VoterSpec::example1()).await;

        // Unknown voter.
        let spec = CandidateSpec::example(Id::new(), *election.id, "President");
        let error: ErrorBody = post(&client, "/candidates", json!(spec), Status::NotFound).await;
        assert!(error.message.starts_with("Voter not found"));

        // Unknown election.
        let spec = CandidateSpec::example(*voter.id, Id::new(), "President");
        let error: ErrorBody = post(&client, "/candidates", json!(spec), Status::NotFound).await;
        assert!(error.message.starts_with("Election not found"));

        // Blank post.
        let spec = CandidateSpec::example(*voter.id, *election.id, " ");
        let _: ErrorBody = post(&client, "/candidates", json!(spec), Status::BadRequest).await;

        // Missing voter.
        let spec = json!({ "electionId": election.id, "post": "President" });
        let _: ErrorBody = post(&client, "/candidates", spec, Status::BadRequest).await;
    }

    #[backend_test]
    async fn duplicate_candidacy_allowed(client: Client) {
        let election = create_election(&client, &ElectionSpec::current_example()).await;
        let voter = register_voter(&client, &VoterSpec::example1()).await;

        testing::add_candidate(&client, *voter.id, *election.id, "President").await;
        testing::add_candidate(&client, *voter.id, *election.id, "Treasurer").await;

        let response = client
            .get(uri!("/api/v1", get_election_candidates(*election.id)))
            .dispatch()
            .await;
        let listed: Vec<CandidateDescription> = response.into_json().await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[backend_test]
    async fn update_moves_votes(client: Client, votes: Coll<Vote>) {
        let election = create_election(&client, &ElectionSpec::active_example()).await;
        let standing = register_voter(&client, &VoterSpec::example1()).await;
        let supporter = register_voter(&client, &VoterSpec::example2()).await;
        let candidate =
            testing::add_candidate(&client, *standing.id, *election.id, "President").await;
        let _: Value = post(
            &client,
            "/votes",
            json!(VoteRequest::new(*supporter.id, *candidate.id)),
            Status::Created,
        )
        .await;

        // Change post and approve; the association is untouched.
        let spec = json!({ "post": "Chair", "bio": "Renamed", "approved": true });
        let response = client
            .put(uri!("/api/v1", update_candidate(*candidate.id)))
            .header(ContentType::JSON)
            .body(spec.to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let updated: CandidateDescription = response.into_json().await.unwrap();
        assert_eq!(updated.post, "Chair");
        assert!(updated.approved);
        assert_eq!(updated.voter_id, standing.id);
        assert_eq!(updated.election_id, election.id);

        // The vote follows the candidate's post.
        let vote = votes
            .find_one(doc! { "candidate_id": *candidate.id }, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(vote.post, "Chair");

        // Moving to an unknown election fails.
        let spec = json!({ "electionId": Id::new().to_string(), "post": "Chair" });
        let response = client
            .put(uri!("/api/v1", update_candidate(*candidate.id)))
            .header(ContentType::JSON)
            .body(spec.to_string())
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test]
    async fn update_collision_keeps_votes(client: Client, votes: Coll<Vote>) {
        let election = create_election(&client, &ElectionSpec::active_example()).await;
        let v1 = register_voter(&client, &VoterSpec::example1()).await;
        let v2 = register_voter(&client, &VoterSpec::example2()).await;
        let supporter = register_voter(&client, &VoterSpec::example3()).await;
        let president = testing::add_candidate(&client, *v1.id, *election.id, "President").await;
        let chair = testing::add_candidate(&client, *v2.id, *election.id, "Chair").await;
        for candidate in [&president, &chair] {
            let _: Value = post(
                &client,
                "/votes",
                json!(VoteRequest::new(*supporter.id, *candidate.id)),
                Status::Created,
            )
            .await;
        }

        // The supporter already voted for a Chair, so their President vote can't follow.
        let spec = json!({ "post": "Chair" });
        let response = client
            .put(uri!("/api/v1", update_candidate(*president.id)))
            .header(ContentType::JSON)
            .body(spec.to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());
        let error: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(error.error, "conflict");

        // Neither the candidate nor the vote changed.
        let response = client
            .get(uri!("/api/v1", get_candidate(*president.id)))
            .dispatch()
            .await;
        let unchanged: CandidateDescription = response.into_json().await.unwrap();
        assert_eq!(unchanged.post, "President");
        let vote = votes
            .find_one(doc! { "candidate_id": *president.id }, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(vote.post, "President");
        assert_eq!(votes.count_documents(None, None).await.unwrap(), 2);
    }

    #[backend_test]
    async fn delete_removes_votes(client: Client, votes: Coll<Vote>) {
        let election = create_election(&client, &ElectionSpec::active_example()).await;
        let standing = register_voter(&client, &VoterSpec::example1()).await;
        let supporter = register_voter(&client, &VoterSpec::example2()).await;
        let candidate =
            testing::add_candidate(&client, *standing.id, *election.id, "President").await;
        let _: Value = post(
            &client,
            "/votes",
            json!(VoteRequest::new(*supporter.id, *candidate.id)),
            Status::Created,
        )
        .await;

        let response = client
            .delete(uri!("/api/v1", delete_candidate(*candidate.id)))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        assert_eq!(votes.count_documents(None, None).await.unwrap(), 0);

        let response = client
            .get(uri!("/api/v1", get_candidate(*candidate.id)))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
        let response = client
            .delete(uri!("/api/v1", delete_candidate(*candidate.id)))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }
}
