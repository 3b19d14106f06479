//! Weather lookup behavior against a mocked OpenWeatherMap endpoint.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use agent_core::Tool;
use rag_assistant::weather::{WeatherClient, WeatherConfig};
use rag_assistant::WeatherTool;

fn client_for(server: &MockServer) -> WeatherClient {
    WeatherClient::new(WeatherConfig::new("clave-prueba").with_base_url(server.uri()))
        .expect("client")
}

async fn mount_geocode(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn madrid_candidates() -> serde_json::Value {
    json!([{"lat": 40.4, "lon": -3.7, "name": "Madrid"}])
}

fn madrid_conditions() -> serde_json::Value {
    json!({
        "main": {"temp": 15, "feels_like": 14, "humidity": 60, "pressure": 1012},
        "weather": [{"description": "cielo claro"}],
        "wind": {"speed": 3.5}
    })
}

#[tokio::test]
async fn empty_geocode_means_city_not_found_and_no_weather_request() {
    let server = MockServer::start().await;
    mount_geocode(&server, json!([])).await;

    // the current-conditions endpoint must never be hit
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(madrid_conditions()))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server).current("Atlantis").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "No se encontro la ciudad Atlantis. Intenta con otro nombre."
    );
}

#[tokio::test]
async fn geocode_http_error_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).current("Madrid").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Error de conexion al buscar Madrid. Codigo: 500"
    );
}

#[tokio::test]
async fn weather_status_401_is_invalid_key() {
    let server = MockServer::start().await;
    mount_geocode(&server, madrid_candidates()).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server).current("Madrid").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "La API Key es invalida. Verifica tu clave de OpenWeatherMap."
    );
}

#[tokio::test]
async fn weather_status_429_is_rate_limited() {
    let server = MockServer::start().await;
    mount_geocode(&server, madrid_candidates()).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = client_for(&server).current("Madrid").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Limite de solicitudes excedido. Intenta en unos minutos."
    );
}

#[tokio::test]
async fn weather_other_status_carries_the_code() {
    let server = MockServer::start().await;
    mount_geocode(&server, madrid_candidates()).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).current("Madrid").await.unwrap_err();

    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn successful_lookup_includes_city_temp_and_description() {
    let server = MockServer::start().await;
    mount_geocode(&server, madrid_candidates()).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "es"))
        .respond_with(ResponseTemplate::new(200).set_body_json(madrid_conditions()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": [{"main": {"temp": 16}, "weather": [{"description": "nubes dispersas"}]}]
        })))
        .mount(&server)
        .await;

    let report = client_for(&server).current("Madrid").await.unwrap();

    assert!(report.contains("Madrid"));
    assert!(report.contains("15"));
    assert!(report.contains("cielo claro"));
    assert!(report.contains("pronostico proximas horas: 16C con nubes dispersas"));
}

#[tokio::test]
async fn forecast_failure_never_degrades_a_successful_lookup() {
    let server = MockServer::start().await;
    mount_geocode(&server, madrid_candidates()).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(madrid_conditions()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let report = client_for(&server).current("Madrid").await.unwrap();

    assert!(report.contains("Clima en Madrid"));
    assert!(report.contains("cielo claro"));
    assert!(!report.contains("pronostico"));
}

#[tokio::test]
async fn localized_name_preferred_over_canonical() {
    let server = MockServer::start().await;
    mount_geocode(
        &server,
        json!([{
            "lat": 51.5, "lon": -0.1, "name": "London",
            "local_names": {"es": "Londres"}
        }]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(madrid_conditions()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": []})))
        .mount(&server)
        .await;

    let report = client_for(&server).current("London").await.unwrap();

    assert!(report.contains("Clima en Londres"));
}

#[tokio::test]
async fn missing_field_is_named_in_the_error() {
    let server = MockServer::start().await;
    mount_geocode(&server, madrid_candidates()).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "main": {"feels_like": 14, "humidity": 60, "pressure": 1012},
            "weather": [{"description": "cielo claro"}],
            "wind": {"speed": 3.5}
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).current("Madrid").await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Error en datos de respuesta: falta campo main.temp"
    );
}

#[tokio::test]
async fn slow_endpoint_times_out_with_marker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let config = WeatherConfig::new("clave-prueba")
        .with_base_url(server.uri())
        .with_request_timeout(Duration::from_millis(200));
    let client = WeatherClient::new(config).expect("client");

    let err = client.current("Madrid").await.unwrap_err();

    assert!(err.to_string().contains("Timeout"));
}

#[tokio::test]
async fn tool_converts_every_failure_into_text() {
    // nothing listens here: connection refused
    let config = WeatherConfig::new("clave-prueba").with_base_url("http://127.0.0.1:1");
    let tool = WeatherTool::new(Arc::new(WeatherClient::new(config).expect("client")));

    let out = tool.call("Madrid").await.unwrap();

    assert_eq!(
        out,
        "Error de conexion: no se pudo conectar al servicio de clima."
    );
}

#[tokio::test]
async fn tool_rejects_blank_city() {
    let config = WeatherConfig::new("clave-prueba").with_base_url("http://127.0.0.1:1");
    let tool = WeatherTool::new(Arc::new(WeatherClient::new(config).expect("client")));

    let out = tool.call("   ").await.unwrap();

    assert!(out.contains("ciudad"));
}
