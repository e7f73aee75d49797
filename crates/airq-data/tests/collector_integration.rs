//! Integration tests for AirQualityCollector against a mock OpenWeather server.

use airq_core::Location;
use airq_data::{AirQualityCollector, BackfillOutcome, DataError, OpenWeatherClient, ReadingStore};
use mockito::Matcher;
use std::time::Duration;

const AIR_BODY: &str = r#"{"list": [{"dt": 1717243200, "main": {"aqi": 2}, "components": {"pm2_5": 12.4, "pm10": 19.9, "o3": 38.2, "no2": 4.8}}]}"#;
const WEATHER_BODY: &str =
    r#"{"main": {"temp": 29.5, "humidity": 66, "pressure": 1010}, "wind": {"speed": 2.7}}"#;

fn test_locations() -> Vec<Location> {
    vec![
        Location::new("parque_central", "Parque Central", 8.3107, -73.6236),
        Location::new("estadio", "Estadio", 8.3016, -73.6228),
    ]
}

async fn test_collector(server: &mockito::ServerGuard) -> AirQualityCollector {
    let client = OpenWeatherClient::with_base_url("test-key", server.url());
    let store = ReadingStore::connect_in_memory().await.unwrap();
    store.init().await.unwrap();
    AirQualityCollector::new(client, store)
        .with_locations(test_locations())
        .with_request_delays(Duration::ZERO, Duration::ZERO)
}

#[tokio::test]
async fn test_collect_all_locations_success() {
    let mut server = mockito::Server::new_async().await;
    let _air = server
        .mock("GET", "/data/2.5/air_pollution")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(AIR_BODY)
        .create_async()
        .await;
    let _weather = server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(WEATHER_BODY)
        .create_async()
        .await;

    let mut collector = test_collector(&server).await;
    let (successful, failed) = collector.collect_all_locations().await.unwrap();
    assert_eq!((successful, failed), (2, 0));

    // One reading persisted per location
    assert_eq!(collector.store().count_readings().await.unwrap(), 2);
    assert_eq!(
        collector
            .store()
            .count_readings_for("estadio")
            .await
            .unwrap(),
        1
    );

    let readings = collector
        .store()
        .recent_readings_for("parque_central", 10)
        .await
        .unwrap();
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].pm2_5, Some(12.4));
    assert_eq!(readings[0].aqi, Some(2));
    assert_eq!(readings[0].temp, Some(29.5));
    assert_eq!(readings[0].wind_speed, Some(2.7));
}

#[tokio::test]
async fn test_collect_all_locations_api_failure() {
    let mut server = mockito::Server::new_async().await;
    let _air = server
        .mock("GET", "/data/2.5/air_pollution")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(AIR_BODY)
        .create_async()
        .await;
    // Weather endpoint is down; both requests must succeed for a reading
    let _weather = server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let mut collector = test_collector(&server).await;
    let (successful, failed) = collector.collect_all_locations().await.unwrap();
    assert_eq!((successful, failed), (0, 2));
}

#[tokio::test]
async fn test_recollection_is_idempotent() {
    let mut server = mockito::Server::new_async().await;
    let _air = server
        .mock("GET", "/data/2.5/air_pollution")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(AIR_BODY)
        .create_async()
        .await;
    let _weather = server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(WEATHER_BODY)
        .create_async()
        .await;

    let client = OpenWeatherClient::with_base_url("test-key", server.url());
    let store = ReadingStore::connect_in_memory().await.unwrap();
    store.init().await.unwrap();
    let mut collector = AirQualityCollector::new(client, store)
        .with_locations(test_locations())
        .with_request_delays(Duration::ZERO, Duration::ZERO);

    // Same observation twice: the duplicate insert is skipped, but the
    // sweep still reports the location as successful
    let first = collector.collect_all_locations().await.unwrap();
    let second = collector.collect_all_locations().await.unwrap();
    assert_eq!(first, (2, 0));
    assert_eq!(second, (2, 0));
    assert_eq!(collector.store().count_readings().await.unwrap(), 2);
}

#[tokio::test]
async fn test_collect_single_location_reports_saved_then_duplicate() {
    let mut server = mockito::Server::new_async().await;
    let _air = server
        .mock("GET", "/data/2.5/air_pollution")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(AIR_BODY)
        .create_async()
        .await;
    let _weather = server
        .mock("GET", "/data/2.5/weather")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(WEATHER_BODY)
        .create_async()
        .await;

    let mut collector = test_collector(&server).await;

    // First collection writes a new row; the repeat hits the unique key
    // and must report the skip instead of a second save
    assert!(collector.collect_single_location("estadio").await.unwrap());
    assert!(!collector.collect_single_location("estadio").await.unwrap());
    assert_eq!(collector.store().count_readings().await.unwrap(), 1);
}

#[tokio::test]
async fn test_collect_single_location_unknown_id() {
    let server = mockito::Server::new_async().await;
    let mut collector = test_collector(&server).await;

    let err = collector
        .collect_single_location("no_such_place")
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::NotFound(_)));
}

#[tokio::test]
async fn test_backfill_saves_history_with_weather() {
    let mut server = mockito::Server::new_async().await;

    // Three hourly observations on 2024-06-01
    let history_body = r#"{"list": [
        {"dt": 1717239600, "main": {"aqi": 1}, "components": {"pm2_5": 8.1, "pm10": 14.0, "o3": 30.0, "no2": 3.0}},
        {"dt": 1717243200, "main": {"aqi": 2}, "components": {"pm2_5": 10.2, "pm10": 17.5, "o3": 33.0, "no2": 3.5}},
        {"dt": 1717246800, "main": {"aqi": 2}, "components": {"pm2_5": 11.0, "pm10": 18.2, "o3": 35.0, "no2": 3.9}}
    ]}"#;
    let _history = server
        .mock("GET", "/data/2.5/air_pollution/history")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(history_body)
        .create_async()
        .await;

    // v3.0 timemachine rejected (plan without One Call 3.0), v2.5 answers
    let _tm_v3 = server
        .mock("GET", "/data/3.0/onecall/timemachine")
        .match_query(Matcher::Any)
        .with_status(401)
        .create_async()
        .await;
    let tm_body = r#"{"hourly": [
        {"dt": 1717239600, "temp": 20.0, "humidity": 80, "pressure": 1011, "wind_speed": 1.0},
        {"dt": 1717243200, "temp": 21.0, "humidity": 78, "pressure": 1011, "wind_speed": 1.4},
        {"dt": 1717246800, "temp": 22.0, "humidity": 75, "pressure": 1010, "wind_speed": 1.8}
    ]}"#;
    let _tm_v25 = server
        .mock("GET", "/data/2.5/onecall/timemachine")
        .match_query(Matcher::Any)
        .with_header("content-type", "application/json")
        .with_body(tm_body)
        .create_async()
        .await;

    let client = OpenWeatherClient::with_base_url("test-key", server.url());
    let store = ReadingStore::connect_in_memory().await.unwrap();
    store.init().await.unwrap();
    let location = Location::new("parque_central", "Parque Central", 8.3107, -73.6236);
    let mut collector = AirQualityCollector::new(client, store)
        .with_locations(vec![location.clone()])
        .with_request_delays(Duration::ZERO, Duration::ZERO);

    let (saved, fetched) = collector.collect_history_window(&location).await.unwrap();
    assert_eq!((saved, fetched), (3, 3));

    // Rows carry the nearest historical weather sample
    let readings = collector
        .store()
        .recent_readings_for("parque_central", 10)
        .await
        .unwrap();
    assert_eq!(readings.len(), 3);
    // Newest first: the 13:00 observation matched the 22.0 °C sample
    assert_eq!(readings[0].timestamp, "2024-06-01T13:00:00Z");
    assert_eq!(readings[0].temp, Some(22.0));
    assert_eq!(readings[2].temp, Some(20.0));
}

#[tokio::test]
async fn test_backfill_sweep_tolerates_failing_endpoint() {
    let mut server = mockito::Server::new_async().await;
    // History endpoint is down entirely
    let _history = server
        .mock("GET", "/data/2.5/air_pollution/history")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let mut collector = test_collector(&server).await;
    let results = collector.collect_last5days_all_locations().await.unwrap();

    // Every location reports a Failed outcome, in configuration order
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "parque_central");
    assert_eq!(results[1].0, "estadio");
    for (_, outcome) in &results {
        assert!(matches!(outcome, BackfillOutcome::Failed { .. }));
        assert_eq!(outcome.saved(), 0);
    }
}
