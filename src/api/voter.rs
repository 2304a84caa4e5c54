use rocket::{http::CookieJar, serde::json::Json, Route, State};

use crate::config::Config;
use crate::error::Result;
use crate::model::{
    api::{
        auth::AuthToken,
        voter::{VoterDescription, VoterLogin, VoterSpec},
    },
    mongodb::Id,
};
use crate::service::VoterService;

pub fn routes() -> Vec<Route> {
    routes![
        get_voters,
        register,
        login,
        update_voter,
        approve_voter,
        delete_voter,
    ]
}

#[get("/voters")]
async fn get_voters(voters: VoterService) -> Result<Json<Vec<VoterDescription>>> {
    let voters = voters.list().await?;
    Ok(Json(voters.into_iter().map(Into::into).collect()))
}

#[post("/voters/register", data = "<spec>", format = "json")]
async fn register(spec: Json<VoterSpec>, voters: VoterService) -> Result<Json<VoterDescription>> {
    Ok(Json(voters.register(spec.0).await?.into()))
}

/// Log in as the voter with these identity details, receiving a voter token.
#[post("/voters/login", data = "<login>", format = "json")]
async fn login(
    login: Json<VoterLogin>,
    cookies: &CookieJar<'_>,
    voters: VoterService,
    config: &State<Config>,
) -> Result<Json<VoterDescription>> {
    let voter = voters.get_by_credentials(login.0).await?;
    cookies.add(AuthToken::new(&voter).into_cookie(config)?);
    Ok(Json(voter.into()))
}

#[put("/voters/<voter_id>", data = "<spec>", format = "json")]
async fn update_voter(
    voter_id: Id,
    spec: Json<VoterSpec>,
    voters: VoterService,
) -> Result<Json<VoterDescription>> {
    Ok(Json(voters.update(voter_id, spec.0).await?.into()))
}

#[put("/voters/<voter_id>/approve?<approved>")]
async fn approve_voter(
    voter_id: Id,
    approved: Option<bool>,
    voters: VoterService,
) -> Result<Json<VoterDescription>> {
    let voter = voters
        .set_approval(voter_id, approved.unwrap_or(true))
        .await?;
    Ok(Json(voter.into()))
}

#[delete("/voters/<voter_id>")]
async fn delete_voter(voter_id: Id, voters: VoterService) -> Result<()> {
    voters.delete(voter_id).await
}

#[cfg(test)]
mod tests {
    use mongodb::bson::doc;
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json::{self, json, Value},
    };

    use crate::api::testing::{add_candidate, create_election, post, register_voter};
    use crate::error::ErrorBody;
    use crate::model::{
        api::{auth::AUTH_TOKEN_COOKIE, election::ElectionSpec, vote::VoteRequest},
        db::{candidate::Candidate, vote::Vote, voter::Voter},
        mongodb::Coll,
    };

    use super::*;

    #[backend_test]
    async fn register_and_list(client: Client, voters: Coll<Voter>) {
        let first = register_voter(&client, &VoterSpec::example1()).await;
        let second = register_voter(&client, &VoterSpec::example2()).await;
        assert!(first.approved);
        assert_eq!(first.university_id, VoterSpec::example1().university_id);

        // The stored voter has a hash rather than the plaintext.
        let stored = voters.find_one(first.id.as_doc(), None).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "cobol4ever");
        assert!(stored.password_hash.starts_with("$argon2"));

        // Listed in ID order, without password hashes.
        let response = client.get(uri!("/api/v1", get_voters)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let body = response.into_string().await.unwrap();
        assert!(!body.contains("password"));
        let listed: Vec<VoterDescription> = serde_json::from_str(&body).unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[backend_test]
    async fn register_duplicate(client: Client) {
        register_voter(&client, &VoterSpec::example1()).await;

        // Same email.
        let mut spec = VoterSpec::example2();
        spec.email = VoterSpec::example1().email;
        let error: ErrorBody =
            post(&client, "/voters/register", json!(spec), Status::Conflict).await;
        assert_eq!(error.error, "conflict");

        // Same university ID.
        let mut spec = VoterSpec::example2();
        spec.university_id = VoterSpec::example1().university_id;
        let _: ErrorBody = post(&client, "/voters/register", json!(spec), Status::Conflict).await;
    }

    #[backend_test]
    async fn register_missing_fields(client: Client) {
        let mut spec = VoterSpec::example1();
        spec.password = None;
        let _: ErrorBody = post(&client, "/voters/register", json!(spec), Status::BadRequest).await;

        let mut spec = VoterSpec::example1();
        spec.university_id = "  ".to_string();
        let _: ErrorBody = post(&client, "/voters/register", json!(spec), Status::BadRequest).await;
    }

    #[backend_test]
    async fn login_matches_identity(client: Client) {
        let spec = VoterSpec::example1();
        let voter = register_voter(&client, &spec).await;

        // Case and surrounding whitespace are ignored.
        let login = json!({
            "firstName": " GRACE ",
            "lastName": "hopper",
            "email": "Grace@Uni.Example",
            "universityId": spec.university_id,
        });
        let found: VoterDescription = post(&client, "/voters/login", login, Status::Ok).await;
        assert_eq!(found, voter);
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());

        // A mismatched name is not found.
        let login = json!({
            "firstName": "Grace",
            "lastName": "Kelly",
            "email": spec.email,
            "universityId": spec.university_id,
        });
        let _: ErrorBody = post(&client, "/voters/login", login, Status::NotFound).await;

        // Missing fields are rejected.
        let login = json!({ "universityId": spec.university_id });
        let _: ErrorBody = post(&client, "/voters/login", login, Status::BadRequest).await;
    }

    #[backend_test]
    async fn padded_details_are_trimmed(client: Client, voters: Coll<Voter>) {
        let mut spec = VoterSpec::example1();
        spec.university_id = "  U1906 ".to_string();
        spec.email = " grace@uni.example".to_string();
        let voter = register_voter(&client, &spec).await;
        assert_eq!(voter.university_id, "U1906");

        let stored = voters.find_one(voter.id.as_doc(), None).await.unwrap().unwrap();
        assert_eq!(stored.university_id, "U1906");
        assert_eq!(stored.email, "grace@uni.example");

        // Login finds the voter whether or not the ID is padded.
        for university_id in ["U1906", " U1906  "] {
            let login = json!({
                "firstName": "Grace",
                "lastName": "Hopper",
                "email": "grace@uni.example",
                "universityId": university_id,
            });
            let found: VoterDescription = post(&client, "/voters/login", login, Status::Ok).await;
            assert_eq!(found.id, voter.id);
        }

        // A padded ID still collides with the stored one.
        let mut spec = VoterSpec::example2();
        spec.university_id = "U1906\t".to_string();
        let _: ErrorBody = post(&client, "/voters/register", json!(spec), Status::Conflict).await;
    }

    #[backend_test]
    async fn update_and_approve(client: Client, voters: Coll<Voter>) {
        let voter = register_voter(&client, &VoterSpec::example1()).await;

        // Update without a password keeps the old hash.
        let old_hash = voters
            .find_one(voter.id.as_doc(), None)
            .await
            .unwrap()
            .unwrap()
            .password_hash
            .clone();
        let mut spec = VoterSpec::example1();
        spec.last_name = "Murray Hopper".to_string();
        spec.password = Some(String::new());
        let response = client
            .put(uri!("/api/v1", update_voter(*voter.id)))
            .header(ContentType::JSON)
            .body(json!(spec).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let updated: VoterDescription = response.into_json().await.unwrap();
        assert_eq!(updated.last_name, "Murray Hopper");
        let stored = voters.find_one(voter.id.as_doc(), None).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, old_hash);

        // Updating onto another voter's email conflicts.
        let other = register_voter(&client, &VoterSpec::example2()).await;
        let mut spec = VoterSpec::example2();
        spec.email = VoterSpec::example1().email;
        let response = client
            .put(uri!("/api/v1", update_voter(*other.id)))
            .header(ContentType::JSON)
            .body(json!(spec).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Conflict, response.status());

        // Approval defaults to true and can be revoked.
        let response = client
            .put(format!("/api/v1/voters/{}/approve?approved=false", voter.id))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let revoked: VoterDescription = response.into_json().await.unwrap();
        assert!(!revoked.approved);
        let response = client
            .put(format!("/api/v1/voters/{}/approve", voter.id))
            .dispatch()
            .await;
        let approved: VoterDescription = response.into_json().await.unwrap();
        assert!(approved.approved);

        // Unknown voters are not found.
        let response = client
            .put(format!("/api/v1/voters/{}/approve?approved=true", Id::new()))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test]
    async fn delete_cascades(
        client: Client,
        voters: Coll<Voter>,
        candidates: Coll<Candidate>,
        votes: Coll<Vote>,
    ) {
        let election = create_election(&client, &ElectionSpec::active_example()).await;
        let standing = register_voter(&client, &VoterSpec::example1()).await;
        let supporter = register_voter(&client, &VoterSpec::example2()).await;
        let other = register_voter(&client, &VoterSpec::example3()).await;
        let candidate = add_candidate(&client, *standing.id, *election.id, "President").await;
        let rival = add_candidate(&client, *other.id, *election.id, "Treasurer").await;

        // The supporter votes for the deleted voter's candidacy; the deleted
        // voter votes for someone else.
        let _: Value = post(
            &client,
            "/votes",
            json!(VoteRequest::new(*supporter.id, *candidate.id)),
            Status::Created,
        )
        .await;
        let _: Value = post(
            &client,
            "/votes",
            json!(VoteRequest::new(*standing.id, *rival.id)),
            Status::Created,
        )
        .await;
        assert_eq!(votes.count_documents(None, None).await.unwrap(), 2);

        let response = client
            .delete(uri!("/api/v1", delete_voter(*standing.id)))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        assert_eq!(voters.count_documents(standing.id.as_doc(), None).await.unwrap(), 0);
        assert_eq!(
            candidates
                .count_documents(doc! { "voter_id": *standing.id }, None)
                .await
                .unwrap(),
            0
        );
        assert_eq!(votes.count_documents(None, None).await.unwrap(), 0);
        assert_eq!(candidates.count_documents(None, None).await.unwrap(), 1);

        // Deleting again is not found.
        let response = client
            .delete(uri!("/api/v1", delete_voter(*standing.id)))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }
}
