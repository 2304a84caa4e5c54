use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::config::Config;
use crate::error::Result;
use crate::model::{
    api::{
        admin::{AdminDescription, AdminLogin, AdminSpec},
        auth::{AuthToken, AUTH_TOKEN_COOKIE},
    },
    db::admin::Admin,
    mongodb::Id,
};
use crate::service::AdminService;

pub fn routes() -> Vec<Route> {
    routes![
        login,
        logout,
        get_admins,
        get_admin,
        create_admin,
        update_admin,
        delete_admin,
    ]
}

#[post("/admins/login", data = "<login>", format = "json")]
async fn login(
    login: Json<AdminLogin>,
    cookies: &CookieJar<'_>,
    admins: AdminService,
    config: &State<Config>,
) -> Result<Json<AdminDescription>> {
    let admin = admins.get_by_credentials(login.0).await?;
    cookies.add(AuthToken::new(&admin).into_cookie(config)?);
    Ok(Json(admin.into()))
}

#[post("/admins/logout")]
fn logout(cookies: &CookieJar<'_>) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}

#[get("/admins")]
async fn get_admins(
    _token: AuthToken<Admin>,
    admins: AdminService,
) -> Result<Json<Vec<AdminDescription>>> {
    let admins = admins.list().await?;
    Ok(Json(admins.into_iter().map(Into::into).collect()))
}

#[get("/admins/<admin_id>")]
async fn get_admin(
    _token: AuthToken<Admin>,
    admin_id: Id,
    admins: AdminService,
) -> Result<Json<AdminDescription>> {
    Ok(Json(admins.get(admin_id).await?.into()))
}

#[post("/admins", data = "<spec>", format = "json")]
async fn create_admin(
    _token: AuthToken<Admin>,
    spec: Json<AdminSpec>,
    admins: AdminService,
) -> Result<Json<AdminDescription>> {
    Ok(Json(admins.create(spec.0).await?.into()))
}

#[put("/admins/<admin_id>", data = "<spec>", format = "json")]
async fn update_admin(
    _token: AuthToken<Admin>,
    admin_id: Id,
    spec: Json<AdminSpec>,
    admins: AdminService,
) -> Result<Json<AdminDescription>> {
    Ok(Json(admins.update(admin_id, spec.0).await?.into()))
}

#[delete("/admins/<admin_id>")]
async fn delete_admin(
    _token: AuthToken<Admin>,
    admin_id: Id,
    admins: AdminService,
) -> Result<()> {
    admins.delete(admin_id).await
}
