//! Free-text address → country code, via a Nominatim-style geocoder.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::domain::CountryCode;
use crate::error::{AppError, GeocodeError};

pub struct GeocodeClient {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl GeocodeClient {
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::new(2, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: settings.nominatim_url.clone(),
            user_agent: settings.user_agent.clone(),
        })
    }

    /// Nominatim rejects anonymous clients, so the user agent goes on every request.
    fn build_request(&self, address: &str) -> RequestBuilder {
        self.client
            .get(&self.base_url)
            .header(USER_AGENT, &self.user_agent)
            .query(&[
                ("q", address),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
    }

    /// Resolve an address, collapsing every failure into `None`.
    pub fn resolve_country(&self, address: &str) -> Option<CountryCode> {
        match self.lookup(address) {
            Ok(code) => code,
            Err(e) => {
                warn!(error = %e, "country detection failed");
                None
            }
        }
    }

    /// Resolve an address, keeping service failures apart from "no match".
    pub fn lookup(&self, address: &str) -> Result<Option<CountryCode>, GeocodeError> {
        if address.trim().is_empty() {
            return Ok(None);
        }

        debug!(url = %self.base_url, "geocoding address");
        let resp = self.build_request(address).send()?;

        if !resp.status().is_success() {
            return Err(GeocodeError::Status(resp.status().as_u16()));
        }

        let body = resp.text()?;
        parse_country_code(&body)
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(default)]
    address: Option<PlaceAddress>,
}

#[derive(Debug, Deserialize)]
struct PlaceAddress {
    #[serde(default)]
    country_code: Option<String>,
}

/// Read `[0].address.country_code` from a geocoder response body.
pub fn parse_country_code(body: &str) -> Result<Option<CountryCode>, GeocodeError> {
    let places: Vec<Place> = serde_json::from_str(body)?;
    Ok(places
        .into_iter()
        .next()
        .and_then(|p| p.address)
        .and_then(|a| a.country_code)
        .and_then(|c| CountryCode::parse(&c)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::OneShotServer;

    #[test]
    fn reads_first_country_code_uppercased() {
        let body = r#"[{"display_name":"Amsterdam","address":{"city":"Amsterdam","country":"Nederland","country_code":"nl"}}]"#;
        let code = parse_country_code(body).unwrap().unwrap();
        assert_eq!(code.as_str(), "NL");
    }

    #[test]
    fn empty_result_is_no_match() {
        assert!(parse_country_code("[]").unwrap().is_none());
    }

    #[test]
    fn missing_fields_are_no_match() {
        assert!(parse_country_code(r#"[{"display_name":"x"}]"#).unwrap().is_none());
        assert!(parse_country_code(r#"[{"address":{"city":"x"}}]"#).unwrap().is_none());
        assert!(parse_country_code(r#"[{"address":{"country_code":""}}]"#).unwrap().is_none());
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(parse_country_code("<html>"), Err(GeocodeError::Parse(_))));
        assert!(matches!(parse_country_code(r#"{"error":"x"}"#), Err(GeocodeError::Parse(_))));
    }

    fn client_for(nominatim_url: String) -> GeocodeClient {
        let settings = Settings {
            nominatim_url,
            ..Settings::from_lookup(|_| None)
        };
        GeocodeClient::new(&settings).unwrap()
    }

    #[test]
    fn request_carries_search_query_and_user_agent() {
        let client = client_for("https://geo.test/search".to_string());
        let req = client.build_request("Amsterdam, Netherlands").build().unwrap();

        assert_eq!(req.url().path(), "/search");
        let query: Vec<(String, String)> = req.url().query_pairs().into_owned().collect();
        let expected = [
            ("q", "Amsterdam, Netherlands"),
            ("format", "json"),
            ("limit", "1"),
            ("addressdetails", "1"),
        ];
        assert_eq!(query.len(), expected.len());
        for ((k, v), (ek, ev)) in query.iter().zip(expected) {
            assert_eq!((k.as_str(), v.as_str()), (ek, ev));
        }
        assert_eq!(req.headers().get(USER_AGENT).unwrap(), "macro-app/1.0");
    }

    #[test]
    fn resolves_against_a_live_endpoint() {
        let server = OneShotServer::respond(200, r#"[{"address":{"country_code":"nl"}}]"#);
        let client = client_for(format!("{}/search", server.base_url));

        let code = client.resolve_country("Amsterdam").unwrap();
        assert_eq!(code.as_str(), "NL");

        let request = server.request().to_ascii_lowercase();
        assert!(request.starts_with("get /search?q=amsterdam&format=json&limit=1&addressdetails=1 "), "{request}");
        assert!(request.contains("user-agent: macro-app/1.0"), "{request}");
    }

    #[test]
    fn server_error_collapses_to_none() {
        let server = OneShotServer::respond(500, "oops");
        let client = client_for(format!("{}/search", server.base_url));
        assert!(client.resolve_country("Paris").is_none());
        server.request();

        let server = OneShotServer::respond(503, "");
        let client = client_for(format!("{}/search", server.base_url));
        assert!(matches!(client.lookup("Paris"), Err(GeocodeError::Status(503))));
        server.request();
    }

    #[test]
    fn unreachable_service_collapses_to_none() {
        let client = client_for("http://127.0.0.1:9/search".to_string());
        assert!(client.resolve_country("Berlin").is_none());
        assert!(matches!(client.lookup("Berlin"), Err(GeocodeError::Transport(_))));
    }

    #[test]
    fn non_json_body_collapses_to_none() {
        let server = OneShotServer::respond(200, "<html>rate limited</html>");
        let client = client_for(format!("{}/search", server.base_url));
        assert!(client.resolve_country("Rome").is_none());
        server.request();
    }

    #[test]
    fn blank_address_short_circuits() {
        let settings = Settings {
            nominatim_url: "http://127.0.0.1:9/unreachable".to_string(),
            ..Settings::from_lookup(|_| None)
        };
        let client = GeocodeClient::new(&settings).unwrap();
        assert!(client.lookup("   ").unwrap().is_none());
    }
}
