use std::{env, process::ExitCode};

use safemap::{
    data_types::{common::Point, route::RouteResult},
    util::{config::Config, geo::GeoUtils},
    App,
};

fn parse_point(lat: &str, lon: &str) -> Option<Point> {
    Some(Point::new(lat.parse().ok()?, lon.parse().ok()?))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let (Some(origin), Some(destination)) = (
        args.get(0..2).and_then(|a| parse_point(&a[0], &a[1])),
        args.get(2..4).and_then(|b| parse_point(&b[0], &b[1])),
    ) else {
        eprintln!("usage: safemap <latA> <lonA> <latB> <lonB>");
        return ExitCode::FAILURE;
    };

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let app = App::start(config);
    let Some(snapshot) = app.route_between(origin, destination).await else {
        eprintln!("session stopped before the route settled");
        return ExitCode::FAILURE;
    };

    match (&snapshot.route, snapshot.summary) {
        (RouteResult::Ready(route), Some(summary)) => {
            println!(
                "{} -> {}: {}, {} on foot ({} points)",
                origin.lon_lat(),
                destination.lon_lat(),
                summary.formatted_length(),
                summary.formatted_time(),
                route.geometry.len()
            );
            if let Some((sw, ne)) = snapshot.bounds {
                println!("centre: {}", GeoUtils::get_center_of_bbox(sw, ne).lon_lat());
            }
            println!("style: {}", snapshot.style_url);
            ExitCode::SUCCESS
        }
        (RouteResult::Failed(reason), _) => {
            eprintln!("no route: {}", reason);
            ExitCode::FAILURE
        }
        (other, _) => {
            eprintln!("unexpected route state: {:?}", other);
            ExitCode::FAILURE
        }
    }
}
