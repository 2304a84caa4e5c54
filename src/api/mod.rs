use rocket::{
    http::Status,
    response::status::Custom,
    serde::json::Json,
    Catcher, Request, Route,
};

use crate::error::ErrorBody;

mod admin;
mod candidate;
mod election;
mod vote;
mod voter;

/// The base path all routes are mounted at.
pub const API_BASE: &str = "/api/v1";

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(voter::routes());
    routes.extend(election::routes());
    routes.extend(candidate::routes());
    routes.extend(vote::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// Give requests that fail before reaching a route (bad paths, malformed
/// bodies, failed guards) the same JSON error body as everything else.
#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> Custom<Json<ErrorBody>> {
    let kind = match status.code {
        400 | 422 => "validation",
        401 => "unauthorized",
        404 => "not_found",
        409 => "conflict",
        _ => "unexpected",
    };
    Custom(status, Json(ErrorBody::new(kind, status.reason_lossy())))
}

/// Helpers that drive the API the way a client would.
#[cfg(test)]
pub(crate) mod testing {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::{serde_json, serde_json::json},
    };
    use serde::de::DeserializeOwned;

    use crate::model::{
        api::{
            candidate::{CandidateDescription, CandidateSpec},
            election::{ElectionDescription, ElectionSpec},
            voter::{VoterDescription, VoterSpec},
        },
        mongodb::Id,
    };

    pub async fn post<T: DeserializeOwned + Send + 'static>(
        client: &Client,
        path: &str,
        body: serde_json::Value,
        expected: Status,
    ) -> T {
        let response = client
            .post(format!("/api/v1{path}"))
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
            .await;
        assert_eq!(expected, response.status());
        response.into_json().await.unwrap()
    }

    pub async fn register_voter(client: &Client, spec: &VoterSpec) -> VoterDescription {
        post(client, "/voters/register", json!(spec), Status::Ok).await
    }

    pub async fn create_election(client: &Client, spec: &ElectionSpec) -> ElectionDescription {
        post(client, "/elections", json!(spec), Status::Created).await
    }

    pub async fn add_candidate(
        client: &Client,
        voter_id: Id,
        election_id: Id,
        post_name: &str,
    ) -> CandidateDescription {
        let spec = CandidateSpec::example(voter_id, election_id, post_name);
        post(client, "/candidates", json!(spec), Status::Created).await
    }
}

#[cfg(test)]
mod tests {
    use rocket::local::asynchronous::Client;

    use super::*;

    #[backend_test]
    async fn unknown_route_is_json(client: Client) {
        let response = client.get("/api/v1/nowhere").dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        let body: ErrorBody = response.into_json().await.unwrap();
        assert_eq!(body.error, "not_found");
    }
}
