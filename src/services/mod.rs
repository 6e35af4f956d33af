pub mod daylight;
pub mod geocoder;
pub mod geolocation;
pub mod routing;
