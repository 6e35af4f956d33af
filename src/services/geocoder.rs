use futures_util::future::BoxFuture;
use serde_derive::Deserialize;
use serde_json::Value;

use crate::{
    data_types::{
        common::Point,
        geocode::{SuggestKind, Suggestion},
    },
    error::FetchError,
    logln,
    util::http::HttpClient,
};

#[derive(Deserialize, Debug)]
struct CatalogResponse<T> {
    result: Option<CatalogResult<T>>,
}

#[derive(Deserialize, Debug)]
struct CatalogResult<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize, Debug)]
struct NamedItem {
    address_name: Option<String>,
    full_name: Option<String>,
}

/// Names the place under a point. `None` when nothing is known about it or
/// the lookup failed.
pub trait LabelSource: Send + Sync {
    fn label(&self, point: Point) -> BoxFuture<'static, Option<String>>;
}

/// Client for the 2GIS catalog: search suggestions and reverse geocoding.
#[derive(Debug, Clone)]
pub struct Geocoder {
    base_url: String,
    api_key: String,
    http: HttpClient,
}

impl Geocoder {
    const CC: &str = "Geocoder";

    pub fn new(base_url: &str, api_key: &str, http: HttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
        }
    }

    pub fn suggest_url(&self, text: &str, kind: SuggestKind, bias: Point) -> String {
        format!(
            "{}/3.0/suggests?q={}&suggest_type={}&location={}&fields=items.point&key={}",
            self.base_url,
            HttpClient::url_encode(text),
            kind.as_query(),
            bias.lon_lat(),
            self.api_key
        )
    }

    pub fn reverse_url(&self, point: Point) -> String {
        format!(
            "{}/3.0/items/geocode?lon={}&lat={}&radius=50&fields=items.name&key={}",
            self.base_url, point.longitude, point.latitude, self.api_key
        )
    }

    /// Catalog suggestions near `bias`. Searching needs a bias point; without
    /// one there is nothing to ask for.
    pub async fn suggest(
        &self,
        text: &str,
        kind: SuggestKind,
        bias: Option<Point>,
    ) -> Result<Vec<Suggestion>, FetchError> {
        let Some(bias) = bias else {
            return Ok(Vec::new());
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let body = self.http.get_json(self.suggest_url(text, kind, bias)).await?;
        let suggestions = parse_suggestions(body)?;
        logln!("{} suggestions for '{}'", suggestions.len(), text);

        Ok(suggestions)
    }

    /// Display name for the place under a dropped marker.
    pub async fn reverse(&self, point: Point) -> Result<Option<String>, FetchError> {
        let body = self.http.get_json(self.reverse_url(point)).await?;
        parse_label(body)
    }
}

impl LabelSource for Geocoder {
    fn label(&self, point: Point) -> BoxFuture<'static, Option<String>> {
        let geocoder = self.clone();
        Box::pin(async move {
            match geocoder.reverse(point).await {
                Ok(label) => label,
                Err(err) => {
                    logln!("Reverse geocoding failed: {}", err);
                    None
                }
            }
        })
    }
}

pub fn parse_suggestions(body: Value) -> Result<Vec<Suggestion>, FetchError> {
    let response: CatalogResponse<Suggestion> = serde_json::from_value(body)?;
    Ok(response.result.map(|result| result.items).unwrap_or_default())
}

pub fn parse_label(body: Value) -> Result<Option<String>, FetchError> {
    let response: CatalogResponse<NamedItem> = serde_json::from_value(body)?;

    Ok(response
        .result
        .and_then(|result| result.items.into_iter().next())
        .and_then(|item| item.address_name.or(item.full_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn geocoder() -> Geocoder {
        Geocoder::new(
            "https://catalog.api.2gis.com/",
            "KEY",
            HttpClient::new(Duration::from_secs(1)),
        )
    }

    #[test]
    fn suggest_url_carries_bias_and_kind() {
        let url = geocoder().suggest_url("Лесная 5", SuggestKind::Address, Point::new(55.54, 37.55));
        assert_eq!(
            url,
            "https://catalog.api.2gis.com/3.0/suggests?q=%D0%9B%D0%B5%D1%81%D0%BD%D0%B0%D1%8F%205\
             &suggest_type=address&location=37.55,55.54&fields=items.point&key=KEY"
        );
    }

    #[test]
    fn reverse_url_uses_a_fifty_metre_radius() {
        let url = geocoder().reverse_url(Point::new(55.54, 37.55));
        assert_eq!(
            url,
            "https://catalog.api.2gis.com/3.0/items/geocode?lon=37.55&lat=55.54&radius=50&fields=items.name&key=KEY"
        );
    }

    #[test]
    fn suggestions_keep_names_and_points() {
        let body = json!({
            "meta": {"code": 200},
            "result": {"items": [
                {"name": "Бутово Парк", "address_name": "Лесная, 5", "building_name": "ТЦ",
                 "point": {"lat": 55.54, "lon": 37.55}, "type": "branch"},
                {"name": "Лесная улица", "type": "street"}
            ], "total": 2}
        });

        let suggestions = parse_suggestions(body).unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].title(), "Лесная, 5");
        assert_eq!(suggestions[0].point, Some(Point::new(55.54, 37.55)));
        assert_eq!(suggestions[1].point, None);
        assert_eq!(suggestions[1].title(), "Лесная улица");
    }

    #[test]
    fn nothing_found_is_an_empty_list() {
        let body = json!({"meta": {"code": 404, "error": {"type": "itemNotFound"}}});
        assert!(parse_suggestions(body).unwrap().is_empty());
    }

    #[test]
    fn label_prefers_address_then_full_name() {
        let with_address = json!({"result": {"items": [{"address_name": "Лесная, 5", "full_name": "Москва, Лесная, 5"}]}});
        assert_eq!(parse_label(with_address).unwrap().as_deref(), Some("Лесная, 5"));

        let full_only = json!({"result": {"items": [{"full_name": "Москва, Бутово"}]}});
        assert_eq!(parse_label(full_only).unwrap().as_deref(), Some("Москва, Бутово"));

        assert_eq!(parse_label(json!({"result": {"items": []}})).unwrap(), None);
    }

    #[tokio::test]
    async fn no_bias_means_no_request() {
        let found = geocoder()
            .suggest("Лесная", SuggestKind::Object, None)
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
