use serde_derive::{Deserialize, Serialize};

use super::common::{Endpoint, Location, Point};

pub const MY_LOCATION: &str = "Моё местоположение";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Suggestion {
    #[serde(default)]
    pub name: String,
    pub address_name: Option<String>,
    pub building_name: Option<String>,
    pub point: Option<Point>,
}

impl Suggestion {
    /// Primary line of the option label.
    pub fn title(&self) -> &str {
        self.address_name.as_deref().unwrap_or(&self.name)
    }

    pub fn my_location(location: &Location) -> Self {
        Self {
            name: MY_LOCATION.to_string(),
            address_name: None,
            building_name: None,
            point: location.coordinates,
        }
    }
}

/// What kind of catalog object a search field looks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuggestKind {
    Object,
    Address,
}

impl SuggestKind {
    pub fn as_query(&self) -> &'static str {
        match self {
            SuggestKind::Object => "object",
            SuggestKind::Address => "address",
        }
    }
}

impl From<Endpoint> for SuggestKind {
    fn from(endpoint: Endpoint) -> Self {
        match endpoint {
            Endpoint::Origin => SuggestKind::Object,
            Endpoint::Destination => SuggestKind::Address,
        }
    }
}

/// The "my location" entry first, then whatever the catalog returned.
pub fn with_current_location(location: &Location, found: Vec<Suggestion>) -> Vec<Suggestion> {
    let mut options = Vec::with_capacity(found.len() + 1);
    if location.determined {
        options.push(Suggestion::my_location(location));
    }
    options.extend(found);
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn my_location_leads_when_known() {
        let found = vec![Suggestion {
            name: "Бутово".to_string(),
            address_name: None,
            building_name: None,
            point: Some(Point::new(55.54, 37.55)),
        }];

        let here = Location::determined(Point::new(55.5, 37.5));
        let options = with_current_location(&here, found.clone());
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].name, MY_LOCATION);
        assert_eq!(options[0].point, Some(Point::new(55.5, 37.5)));

        let options = with_current_location(&Location::undetermined(), found);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].title(), "Бутово");
    }
}
