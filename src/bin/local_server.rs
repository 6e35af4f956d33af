use rocket::http::{ContentType, Status};
use rocket::serde::json::Json;
use rocket::State;
use safemap::{
    data_types::common::{Endpoint, Point},
    services::geolocation::LocationReport,
    util::{config::Config, geo::GeoUtils},
    App,
};
use serde::Serialize;
use serde_derive::Deserialize;

#[macro_use]
extern crate rocket;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::{Request, Response};

pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Cross-Origin-Resource-Sharing Fairing",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, PATCH, PUT, DELETE, HEAD, OPTIONS, GET",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

type Reply = (Status, (ContentType, String));

fn json_reply<T: Serialize>(value: &T) -> Reply {
    match serde_json::to_string(value) {
        Ok(body) => (Status::Ok, (ContentType::JSON, body)),
        Err(err) => (
            Status::InternalServerError,
            (ContentType::Text, err.to_string()),
        ),
    }
}

fn text_reply(status: Status, body: impl Into<String>) -> Reply {
    (status, (ContentType::Text, body.into()))
}

fn accepted(sent: bool) -> Status {
    if sent {
        Status::Accepted
    } else {
        Status::ServiceUnavailable
    }
}

#[derive(Deserialize)]
struct EndpointBody {
    lat: f64,
    lon: f64,
    label: Option<String>,
}

#[derive(Deserialize)]
struct ThemeBody {
    natural_cycle: bool,
    dark: Option<bool>,
}

#[options("/<_..>")]
fn all_options() {
    /* Intentionally left empty */
}

#[get("/state")]
fn state(app: &State<App>) -> Reply {
    json_reply(&app.session().snapshot())
}

#[put("/endpoints/<letter>", data = "<body>")]
fn put_endpoint(app: &State<App>, letter: &str, body: Json<EndpointBody>) -> Status {
    let Some(endpoint) = Endpoint::from_letter(letter) else {
        return Status::NotFound;
    };

    let body = body.into_inner();
    let point = Point::new(body.lat, body.lon);
    let session = app.session();
    accepted(match body.label {
        Some(label) => session.select_endpoint(endpoint, point, label),
        None => session.drag_endpoint(endpoint, point),
    })
}

#[delete("/endpoints/<letter>")]
fn delete_endpoint(app: &State<App>, letter: &str) -> Status {
    match Endpoint::from_letter(letter) {
        Some(endpoint) => accepted(app.session().clear_endpoint(endpoint)),
        None => Status::NotFound,
    }
}

#[get("/suggest/<letter>?<q>")]
async fn suggest(app: &State<App>, letter: &str, q: &str) -> Reply {
    let Some(endpoint) = Endpoint::from_letter(letter) else {
        return text_reply(Status::NotFound, "");
    };

    match app.suggest(endpoint, q).await {
        Ok(options) => json_reply(&options),
        Err(err) => text_reply(Status::BadGateway, err.to_string()),
    }
}

#[put("/theme", data = "<body>")]
fn put_theme(app: &State<App>, body: Json<ThemeBody>) -> Status {
    let session = app.session();
    let mut sent = session.set_natural_cycle(body.natural_cycle);
    if let Some(dark) = body.dark {
        sent &= session.set_dark(dark);
    }

    accepted(sent)
}

/// `{"lat", "lon"}` or `{"error": "permission_denied" | "unavailable" | ...}`
#[put("/location", data = "<report>")]
fn put_location(app: &State<App>, report: Json<LocationReport>) -> Status {
    accepted(app.session().report_location(report.into_inner().into_result()))
}

#[delete("/alert")]
fn delete_alert(app: &State<App>) -> Status {
    accepted(app.session().dismiss_alert())
}

#[get("/route")]
fn route_geojson(app: &State<App>) -> Reply {
    json_reply(&app.session().snapshot().route.as_geojson())
}

#[get("/route/polyline")]
fn route_polyline(app: &State<App>) -> Reply {
    let snapshot = app.session().snapshot();
    let Some(route) = snapshot.route.route() else {
        return text_reply(Status::NotFound, "");
    };

    match GeoUtils::encode_polyline(&route.geometry) {
        Ok(polyline) => text_reply(Status::Ok, polyline),
        Err(err) => text_reply(Status::InternalServerError, err),
    }
}

#[launch]
async fn rocket() -> _ {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    rocket::build().manage(App::start_hosted(config)).attach(Cors).mount(
        "/",
        routes![
            state,
            put_endpoint,
            delete_endpoint,
            suggest,
            put_theme,
            put_location,
            delete_alert,
            route_geojson,
            route_polyline,
            all_options
        ],
    )
}
