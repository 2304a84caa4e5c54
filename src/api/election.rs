use rocket::{response::status::Created, serde::json::Json, Route};

use crate::error::{Error, Result};
use crate::model::{
    api::election::{ElectionDescription, ElectionSpec, StatusUpdate},
    mongodb::Id,
};
use crate::service::ElectionService;

pub fn routes() -> Vec<Route> {
    routes![
        get_elections,
        get_election,
        create_election,
        update_election,
        update_status,
        delete_election,
    ]
}

#[get("/elections")]
async fn get_elections(elections: ElectionService) -> Result<Json<Vec<ElectionDescription>>> {
    let elections = elections.list().await?;
    Ok(Json(elections.into_iter().map(Into::into).collect()))
}

#[get("/elections/<election_id>")]
async fn get_election(
    election_id: Id,
    elections: ElectionService,
) -> Result<Json<ElectionDescription>> {
    Ok(Json(elections.get(election_id).await?.into()))
}

#[post("/elections", data = "<spec>", format = "json")]
async fn create_election(
    spec: Json<ElectionSpec>,
    elections: ElectionService,
) -> Result<Created<Json<ElectionDescription>>> {
    let election = elections.create(spec.0).await?;
    let location = uri!("/api/v1", get_election(election.id)).to_string();
    Ok(Created::new(location).body(Json(election.into())))
}

#[put("/elections/<election_id>", data = "<spec>", format = "json")]
async fn update_election(
    election_id: Id,
    spec: Json<ElectionSpec>,
    elections: ElectionService,
) -> Result<Json<ElectionDescription>> {
    Ok(Json(elections.update(election_id, spec.0).await?.into()))
}

#[put("/elections/<election_id>/status", data = "<update>", format = "json")]
async fn update_status(
    election_id: Id,
    update: Json<StatusUpdate>,
    elections: ElectionService,
) -> Result<Json<ElectionDescription>> {
    let status = update
        .0
        .status
        .filter(|status| !status.trim().is_empty())
        .ok_or_else(|| Error::Validation("New status must be provided".to_string()))?;
    Ok(Json(elections.update_status(election_id, &status).await?.into()))
}

#[delete("/elections/<election_id>")]
async fn delete_election(election_id: Id, elections: ElectionService) -> Result<()> {
    elections.delete(election_id).await
}
