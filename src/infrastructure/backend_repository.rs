// Fleet backend repository implementation
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::error::FetchError;
use crate::domain::telemetry::{DateRange, TelemetrySample, VehicleId};
use crate::domain::vehicle::Vehicle;
use crate::infrastructure::config::{prepare_query, BackendSettings};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone)]
pub struct BackendRepository {
    base_url: String,
    settings: BackendSettings,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TrackResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    points: Vec<serde_json::Map<String, Value>>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VehicleListing {
    Plain(Vec<RawVehicle>),
    Wrapped { vehicles: Vec<RawVehicle> },
}

#[derive(Debug, Deserialize)]
struct RawVehicle {
    #[serde(rename = "ID", alias = "id")]
    id: Value,
    #[serde(rename = "Name", alias = "name", default)]
    name: Option<String>,
}

impl BackendRepository {
    pub fn new(settings: BackendSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            settings,
            client,
        })
    }

    fn session_vars(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("session".to_string(), encode(&self.settings.session));
        vars.insert("schema".to_string(), encode(&self.settings.schema_id));
        vars
    }

    fn vehicles_url(&self) -> String {
        let path = prepare_query(&self.settings.vehicles_path, &self.session_vars());
        format!("{}{}", self.base_url, path)
    }

    fn track_url(&self, vehicle_id: &VehicleId, range: DateRange) -> String {
        let mut vars = self.session_vars();
        vars.insert("device".to_string(), encode(vehicle_id.as_str()));
        vars.insert("from".to_string(), encode(&format_time(range.from)));
        vars.insert("to".to_string(), encode(&format_time(range.to)));
        let path = prepare_query(&self.settings.track_path, &vars);
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(FetchError::Backend {
                status: status.as_u16(),
                message: error_message(&body).unwrap_or(body),
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TelemetryRepository for BackendRepository {
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, FetchError> {
        let listing: VehicleListing = self.get_json(&self.vehicles_url()).await?;
        Ok(decode_vehicles(listing))
    }

    async fn fetch_telemetry(
        &self,
        vehicle_id: &VehicleId,
        metric_keys: &[String],
        range: DateRange,
    ) -> Result<Vec<TelemetrySample>, FetchError> {
        let response: TrackResponse = self.get_json(&self.track_url(vehicle_id, range)).await?;
        decode_track(response, metric_keys)
    }
}

fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

fn format_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `error` field of a JSON error body, if the body is one.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(s) => Some(s.clone()),
        _ => value.get("message")?.as_str().map(str::to_string),
    }
}

fn decode_vehicles(listing: VehicleListing) -> Vec<Vehicle> {
    let raw = match listing {
        VehicleListing::Plain(vehicles) => vehicles,
        VehicleListing::Wrapped { vehicles } => vehicles,
    };

    raw.into_iter()
        .filter_map(|v| {
            let id = match v.id {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                other => {
                    tracing::debug!("skipping vehicle with unusable id {}", other);
                    return None;
                }
            };
            Some(Vehicle::new(VehicleId::new(id), v.name.as_deref().unwrap_or("")))
        })
        .collect()
}

fn decode_track(response: TrackResponse, metric_keys: &[String]) -> Result<Vec<TelemetrySample>, FetchError> {
    if !response.success {
        let message = match response.error {
            Some(Value::String(s)) => s,
            _ => response
                .message
                .unwrap_or_else(|| "request was not successful".to_string()),
        };
        return Err(FetchError::Rejected(message));
    }

    let mut skipped = 0;
    let mut samples: Vec<TelemetrySample> = Vec::with_capacity(response.points.len());
    for point in response.points {
        match decode_point(point, metric_keys) {
            Some(sample) => samples.push(sample),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!("skipped {} points without a readable timestamp", skipped);
    }

    samples.sort_by_key(|s| s.timestamp);
    Ok(samples)
}

/// Keep the requested numeric metrics, or every numeric field when none
/// were requested.
fn decode_point(mut point: serde_json::Map<String, Value>, metric_keys: &[String]) -> Option<TelemetrySample> {
    let timestamp = parse_timestamp(point.remove("t")?.as_str()?)?;

    let metrics: BTreeMap<String, f64> = point
        .into_iter()
        .filter(|(key, _)| metric_keys.is_empty() || metric_keys.contains(key))
        .filter_map(|(key, value)| value.as_f64().map(|v| (key, v)))
        .collect();

    Some(TelemetrySample::new(timestamp, metrics))
}

/// RFC 3339, or a naive `YYYY-MM-DD HH:MM:SS` read as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(time.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}
