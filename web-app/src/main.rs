#![allow(clippy::no_effect_underscore_binding)]
use rocket::{
    serde::json::{json, Json, Value},
    Build, Request, Rocket, State,
};
use shared::data::{VehicleQuery, USAGE};
use time::OffsetDateTime;

use cors::CorsFairing;
use error::Error;
use source::{PageSource, SourceFairing};

mod config;
mod cors;
mod error;
mod extract;
mod source;
#[cfg(test)]
mod tests;

#[macro_use]
extern crate rocket;

#[get("/")]
fn index() -> Json<Value> {
    Json(json!({
        "status": "online",
        "service": "Vehicle Information API",
        "endpoint": USAGE,
    }))
}

#[get("/health")]
fn health() -> Json<Value> {
    #[allow(clippy::cast_precision_loss)]
    let timestamp = OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 / 1e9;
    Json(json!({
        "status": "healthy",
        "timestamp": timestamp,
    }))
}

#[get("/api/vehicle-info?<rc>")]
async fn vehicle_info(
    rc: Option<&str>,
    source: &State<Box<dyn PageSource>>,
) -> Result<Json<Value>, Error> {
    let query = VehicleQuery::parse(rc)?;

    let html = match source.fetch(&query).await {
        Ok(html) => html,
        Err(e) => {
            warn!("Could not load the page for {query}: {e}");
            return Err(e.into());
        }
    };

    let info = extract::extract(&query, &html);
    Ok(Json(info.to_json()?))
}

#[catch(404)]
fn not_found(request: &Request<'_>) -> Json<Value> {
    Json(json!({
        "error": format!("No route for {}", request.uri()),
        "usage": USAGE,
    }))
}

#[catch(500)]
fn internal_error() -> Json<Value> {
    Json(json!({ "error": "Internal server error" }))
}

/// Routes, catchers and CORS, without an outbound page source attached.
fn app() -> Rocket<Build> {
    rocket::build()
        .attach(CorsFairing::fairing())
        .mount("/", routes![index, health, vehicle_info, cors::preflight])
        .register("/", catchers![not_found, internal_error])
}

#[launch]
fn rocket() -> _ {
    app()
        .configure(config::figment())
        .attach(SourceFairing::from_env())
}
