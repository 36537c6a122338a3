//! National Weather Service alerts and forecasts
//!
//! Bundled with the `weather` entry point next to the KEGG tools.

use crate::http::{join_url, read_json, send_checked, UpstreamResult};
use reqwest::header::{ACCEPT, USER_AGENT};
use serde_json::Value;
use tracing::warn;

pub const NWS_USER_AGENT: &str = "weather-app/1.0";
const NWS_ACCEPT: &str = "application/geo+json";

/// Forecast periods included in a report
pub const FORECAST_PERIODS: usize = 5;

/// Client for `api.weather.gov`
#[derive(Clone)]
pub struct NwsClient {
    http: reqwest::Client,
    base_url: String,
}

impl NwsClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn fetch(&self, url: &str) -> UpstreamResult<Value> {
        let request = self
            .http
            .get(url)
            .header(USER_AGENT, NWS_USER_AGENT)
            .header(ACCEPT, NWS_ACCEPT);
        let response = send_checked(request, url).await?;
        read_json(response, url).await
    }

    async fn fetch_or_log(&self, url: &str) -> Option<Value> {
        match self.fetch(url).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("NWS request failed: {}", e);
                None
            }
        }
    }

    /// Active alerts for a two-letter US state code
    pub async fn alerts(&self, state: &str) -> String {
        let url = join_url(&self.base_url, &format!("alerts/active/area/{}", state));

        let features = match self.fetch_or_log(&url).await {
            Some(data) => match data.get("features").and_then(Value::as_array) {
                Some(features) => features.clone(),
                None => return "Unable to fetch alerts or no alerts found.".to_string(),
            },
            None => return "Unable to fetch alerts or no alerts found.".to_string(),
        };

        if features.is_empty() {
            return "No active alerts for this state.".to_string();
        }

        features
            .iter()
            .map(format_alert)
            .collect::<Vec<_>>()
            .join("\n---\n")
    }

    /// Forecast for the next periods at a location
    pub async fn forecast(&self, latitude: f64, longitude: f64) -> String {
        let points_url = join_url(&self.base_url, &format!("points/{},{}", latitude, longitude));

        let forecast_url = self
            .fetch_or_log(&points_url)
            .await
            .and_then(|points| {
                points
                    .pointer("/properties/forecast")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            });

        let Some(forecast_url) = forecast_url else {
            return "Unable to fetch forecast data for this location.".to_string();
        };

        let periods = self
            .fetch_or_log(&forecast_url)
            .await
            .and_then(|data| {
                data.pointer("/properties/periods")
                    .and_then(Value::as_array)
                    .cloned()
            });

        let Some(periods) = periods else {
            return "Unable to fetch detailed forecast.".to_string();
        };

        periods
            .iter()
            .take(FORECAST_PERIODS)
            .map(format_period)
            .collect::<Vec<_>>()
            .join("\n---\n")
    }
}

fn field<'a>(props: &'a Value, key: &str, default: &'a str) -> &'a str {
    props.get(key).and_then(Value::as_str).unwrap_or(default)
}

fn format_alert(feature: &Value) -> String {
    let props = feature.get("properties").unwrap_or(&Value::Null);
    format!(
        "\nEvent: {}\nArea: {}\nSeverity: {}\nDescription: {}\nInstructions: {}\n",
        field(props, "event", "Unknown"),
        field(props, "areaDesc", "Unknown"),
        field(props, "severity", "Unknown"),
        field(props, "description", "No description available"),
        field(props, "instruction", "No specific instructions provided"),
    )
}

fn display(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn format_period(period: &Value) -> String {
    format!(
        "\n{}:\nTemperature: {}°{}\nWind: {} {}\nForecast: {}\n",
        display(period.get("name")),
        display(period.get("temperature")),
        display(period.get("temperatureUnit")),
        display(period.get("windSpeed")),
        display(period.get("windDirection")),
        display(period.get("detailedForecast")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_client;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> NwsClient {
        NwsClient::new(build_client(Duration::from_secs(5)).unwrap(), server.uri())
    }

    #[test]
    fn test_format_alert_defaults() {
        let text = format_alert(&json!({"properties": {"event": "Heat Advisory"}}));
        assert!(text.contains("Event: Heat Advisory"));
        assert!(text.contains("Area: Unknown"));
        assert!(text.contains("Instructions: No specific instructions provided"));
    }

    #[tokio::test]
    async fn test_alerts_sends_nws_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/alerts/active/area/CA"))
            .and(header("user-agent", NWS_USER_AGENT))
            .and(header("accept", NWS_ACCEPT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "features": [
                    {"properties": {"event": "Wind Advisory", "areaDesc": "Bay Area"}},
                    {"properties": {"event": "Flood Watch"}}
                ]
            })))
            .mount(&server)
            .await;

        let report = client_for(&server).alerts("CA").await;
        assert_eq!(report.matches("\n---\n").count(), 1);
        assert!(report.contains("Area: Bay Area"));
        assert!(report.contains("Event: Flood Watch"));
    }

    #[tokio::test]
    async fn test_alerts_empty_and_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/alerts/active/area/NY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"features": []})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/alerts/active/area/XX"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.alerts("NY").await, "No active alerts for this state.");
        assert_eq!(
            client.alerts("XX").await,
            "Unable to fetch alerts or no alerts found."
        );
    }

    #[tokio::test]
    async fn test_forecast_follows_points_link() {
        let server = MockServer::start().await;
        let periods: Vec<_> = (1..=7)
            .map(|i| {
                json!({
                    "name": format!("Period {}", i),
                    "temperature": 60 + i,
                    "temperatureUnit": "F",
                    "windSpeed": "10 mph",
                    "windDirection": "W",
                    "detailedForecast": "Sunny."
                })
            })
            .collect();
        Mock::given(method("GET"))
            .and(path("/points/37.7749,-122.4194"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "properties": {"forecast": format!("{}/gridpoints/MTR/85,105/forecast", server.uri())}
            })))
            .mount(&server)
            .await;
        let forecast = json!({"properties": {"periods": periods}});
        Mock::given(method("GET"))
            .and(path("/gridpoints/MTR/85,105/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast))
            .mount(&server)
            .await;

        let report = client_for(&server).forecast(37.7749, -122.4194).await;
        assert!(report.contains("Period 1:\nTemperature: 61°F"));
        assert!(report.contains("Period 5:"));
        assert!(!report.contains("Period 6:"));
    }

    #[tokio::test]
    async fn test_forecast_unknown_location() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/points/0,0"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert_eq!(
            client_for(&server).forecast(0.0, 0.0).await,
            "Unable to fetch forecast data for this location."
        );
    }
}
