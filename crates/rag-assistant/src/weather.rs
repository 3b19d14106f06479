//! Weather Lookup
//!
//! Two-step OpenWeatherMap lookup: geocode the city name, then fetch
//! current conditions, plus a best-effort short-range forecast addendum.
//! Failures are a closed set of [`WeatherError`] kinds; their `Display`
//! texts are the user-facing Spanish messages, produced only at the tool
//! boundary. No path retries and no path propagates a panic.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Default OpenWeatherMap endpoint (geocoding and data share a host)
pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org";

/// Per-request bound for every weather sub-call, forecast included
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Weather lookup failure kinds
///
/// Display strings are what the user ultimately sees, so they stay in
/// Spanish and never leak transport internals beyond the status code.
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("No se encontro la ciudad {0}. Intenta con otro nombre.")]
    CityNotFound(String),

    #[error("Error de conexion al buscar {city}. Codigo: {status}")]
    Geocode { city: String, status: u16 },

    #[error("La API Key es invalida. Verifica tu clave de OpenWeatherMap.")]
    InvalidApiKey,

    #[error("Limite de solicitudes excedido. Intenta en unos minutos.")]
    RateLimited,

    #[error("Error al obtener clima. Codigo HTTP: {0}")]
    Status(u16),

    #[error("Timeout: el servicio de clima tardo demasiado en responder.")]
    Timeout,

    #[error("Error de conexion: no se pudo conectar al servicio de clima.")]
    Connection,

    #[error("Error en datos de respuesta: falta campo {0}")]
    MissingField(&'static str),

    #[error("Error inesperado: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connection
        } else {
            Self::Unexpected(e.to_string())
        }
    }
}

/// Weather client configuration
#[derive(Clone, Debug)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: String,

    /// Endpoint base URL (overridable for tests)
    pub base_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl WeatherConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("OPENWEATHER_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENWEATHER_API_KEY no definida"))?;
        let base_url =
            std::env::var("OPENWEATHER_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        Ok(Self {
            api_key,
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

// Wire types. Every field the lookup needs is Option so that a missing
// key surfaces as MissingField naming the path, not as a decode error.

#[derive(Debug, Deserialize)]
struct GeoCandidate {
    lat: Option<f64>,
    lon: Option<f64>,
    name: Option<String>,
    #[serde(default)]
    local_names: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    main: Option<MainReadings>,
    weather: Option<Vec<ConditionDescription>>,
    wind: Option<Wind>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<f64>,
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionDescription {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Forecast {
    list: Option<Vec<ForecastEntry>>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    main: Option<MainReadings>,
    weather: Option<Vec<ConditionDescription>>,
}

/// OpenWeatherMap client
pub struct WeatherClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| WeatherError::Unexpected(e.to_string()))?;

        Ok(Self {
            http,
            api_key: config.api_key,
            base_url: config.base_url,
        })
    }

    /// Look up current conditions for a free-text city name
    pub async fn current(&self, city: &str) -> Result<String, WeatherError> {
        let city = city.trim();

        // Paso 1: coordinates and localized display name
        let url = format!("{}/geo/1.0/direct", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("q", city), ("limit", "1"), ("appid", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Geocode {
                city: city.to_string(),
                status: response.status().as_u16(),
            });
        }

        let candidates: Vec<GeoCandidate> = response.json().await?;
        let Some(candidate) = candidates.into_iter().next() else {
            return Err(WeatherError::CityNotFound(city.to_string()));
        };

        let lat = candidate.lat.ok_or(WeatherError::MissingField("lat"))?;
        let lon = candidate.lon.ok_or(WeatherError::MissingField("lon"))?;
        let display_name = candidate
            .local_names
            .as_ref()
            .and_then(|names| names.get("es").cloned())
            .or(candidate.name)
            .ok_or(WeatherError::MissingField("name"))?;

        // Paso 2: current conditions
        let url = format!("{}/data/2.5/weather", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", "metric".into()),
                ("lang", "es".into()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        match response.status().as_u16() {
            200 => {}
            401 => return Err(WeatherError::InvalidApiKey),
            429 => return Err(WeatherError::RateLimited),
            status => return Err(WeatherError::Status(status)),
        }

        let conditions: CurrentConditions = response.json().await?;
        let main = conditions.main.ok_or(WeatherError::MissingField("main"))?;
        let temp = main.temp.ok_or(WeatherError::MissingField("main.temp"))?;
        let feels_like = main
            .feels_like
            .ok_or(WeatherError::MissingField("main.feels_like"))?;
        let humidity = main
            .humidity
            .ok_or(WeatherError::MissingField("main.humidity"))?;
        let pressure = main
            .pressure
            .ok_or(WeatherError::MissingField("main.pressure"))?;
        let description = conditions
            .weather
            .and_then(|mut w| if w.is_empty() { None } else { Some(w.remove(0)) })
            .and_then(|w| w.description)
            .ok_or(WeatherError::MissingField("weather.description"))?;
        let wind_speed = conditions
            .wind
            .and_then(|w| w.speed)
            .ok_or(WeatherError::MissingField("wind.speed"))?;

        // Paso 3: best-effort forecast addendum. A forecast failure must
        // never turn a successful current-conditions lookup into an error.
        let addendum = self.forecast_addendum(lat, lon).await.unwrap_or_default();

        Ok(format!(
            "Clima en {display_name}: temperatura {temp}C (sensacion {feels_like}C), \
             {description}, humedad {humidity}%, viento {wind_speed} m/s, \
             presion {pressure} hPa{addendum}"
        ))
    }

    /// First forecast entry as a one-clause addendum; None on any failure
    async fn forecast_addendum(&self, lat: f64, lon: f64) -> Option<String> {
        let url = format!("{}/data/2.5/forecast", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", "metric".into()),
                ("lang", "es".into()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let forecast: Forecast = response.json().await.ok()?;
        let entry = forecast.list?.into_iter().next()?;
        let temp = entry.main?.temp?;
        let description = entry
            .weather
            .and_then(|mut w| if w.is_empty() { None } else { Some(w.remove(0)) })?
            .description?;

        Some(format!(
            ", pronostico proximas horas: {temp}C con {description}"
        ))
    }
}
