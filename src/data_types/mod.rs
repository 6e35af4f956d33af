pub mod common;
pub mod daylight;
pub mod geocode;
pub mod route;
