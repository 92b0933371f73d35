//! Unit tests for the resolution pipeline.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::time::Instant;

use super::*;
use crate::domain::{Coordinates, NewStation, Station, StationId};
use crate::geocoding::{
    GeocodeError, LocalProvider, MapsCoProvider, NominatimProvider, ProviderChain,
    ProviderRequest, Transport,
};
use crate::stations::{MemoryStationStore, StationStore};

const LOCAL: &str = "http://local/api/reverse-geocode";
const FIRST: &str = "http://first/reverse";
const SECOND: &str = "http://second/reverse";

/// One request seen by the mock transport.
#[derive(Debug, Clone)]
struct Call {
    url: String,
    lat: String,
    start: Instant,
    end: Instant,
}

/// Answers by (url, lat) after a fixed latency; anything unknown is a 503.
struct MockTransport {
    replies: HashMap<(String, String), Value>,
    latency: Duration,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl MockTransport {
    fn new() -> Self {
        Self {
            replies: HashMap::new(),
            latency: Duration::from_millis(120),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn reply(mut self, url: &str, lat: f64, body: Value) -> Self {
        self.replies.insert((url.to_string(), lat.to_string()), body);
        self
    }
}

impl Transport for MockTransport {
    async fn get_json(&self, request: &ProviderRequest) -> Result<Value, GeocodeError> {
        let start = Instant::now();
        tokio::time::sleep(self.latency).await;

        let lat = request.query_value("lat").unwrap_or_default().to_string();
        self.calls.lock().unwrap().push(Call {
            url: request.url.clone(),
            lat: lat.clone(),
            start,
            end: Instant::now(),
        });

        self.replies
            .get(&(request.url.clone(), lat))
            .cloned()
            .ok_or(GeocodeError::Api {
                status: 503,
                message: "unavailable".into(),
            })
    }
}

struct Harness {
    store: Arc<MemoryStationStore>,
    pipeline: ResolutionPipeline<MemoryStationStore, MockTransport>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Harness {
    fn new(transport: MockTransport) -> Self {
        let calls = Arc::clone(&transport.calls);
        let chain = ProviderChain::new(transport)
            .with_primary(LocalProvider::new("http://local"))
            .with_fallback(NominatimProvider::new().with_endpoint(FIRST))
            .with_fallback(MapsCoProvider::new().with_endpoint(SECOND));
        let store = Arc::new(MemoryStationStore::new());
        let pipeline =
            ResolutionPipeline::new(Arc::clone(&store), chain, &PipelineConfig::default());
        Self {
            store,
            pipeline,
            calls,
        }
    }

    fn add(&self, lat: f64, address: Option<&str>) -> Station {
        self.store.create(NewStation {
            center: Coordinates::new(lat, 17.1077),
            bikes: 4,
            capacity: 20,
            address: address.map(str::to_string),
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Latitudes in the order the primary provider was asked for them.
    fn resolutions(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.url == LOCAL)
            .map(|c| c.lat)
            .collect()
    }
}

fn local_address(address: &str) -> Value {
    json!({ "address": address })
}

#[tokio::test(start_paused = true)]
async fn duplicate_requests_resolve_once() {
    let transport = MockTransport::new().reply(LOCAL, 48.1, local_address("Obchodná 1"));
    let h = Harness::new(transport);
    let station = h.add(48.1, None);

    assert!(h.pipeline.request_resolution(&station, false));
    assert!(!h.pipeline.request_resolution(&station, false));
    h.pipeline.drained().await;

    assert_eq!(h.resolutions(), vec!["48.1"]);
    let stored = h.store.get(station.id).unwrap();
    assert_eq!(stored.address.as_deref(), Some("Obchodná 1"));
    assert!(!stored.address_requested);
}

#[tokio::test(start_paused = true)]
async fn stale_snapshot_still_deduplicated() {
    let transport = MockTransport::new().reply(LOCAL, 48.1, local_address("Obchodná 1"));
    let h = Harness::new(transport);
    let snapshot = h.add(48.1, None);

    // Both callers hold the same pre-request snapshot with the flag unset
    assert!(h.pipeline.request_resolution(&snapshot, false));
    assert!(!snapshot.address_requested);
    assert!(!h.pipeline.request_resolution(&snapshot, true));
    h.pipeline.drained().await;

    assert_eq!(h.resolutions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn resolved_address_needs_force() {
    let transport = MockTransport::new().reply(LOCAL, 48.1, local_address("Nová adresa"));
    let h = Harness::new(transport);
    let station = h.add(48.1, Some("Stará adresa"));

    assert!(!h.pipeline.request_resolution(&station, false));
    h.pipeline.drained().await;
    assert!(h.calls().is_empty());
    assert!(!h.store.get(station.id).unwrap().address_requested);

    assert!(h.pipeline.request_resolution(&station, true));
    h.pipeline.drained().await;
    assert_eq!(
        h.store.get(station.id).unwrap().address.as_deref(),
        Some("Nová adresa")
    );
}

#[tokio::test(start_paused = true)]
async fn coordinate_label_is_reresolved() {
    let transport = MockTransport::new().reply(LOCAL, 48.1, local_address("Hlavná 5"));
    let h = Harness::new(transport);
    let station = h.add(48.1, Some("48.1000°, 17.1077°"));

    assert!(h.pipeline.request_resolution(&station, false));
    h.pipeline.drained().await;
    assert_eq!(
        h.store.get(station.id).unwrap().address.as_deref(),
        Some("Hlavná 5")
    );
}

#[tokio::test(start_paused = true)]
async fn processed_in_enqueue_order() {
    let h = Harness::new(MockTransport::new());
    let a = h.add(48.1, None);
    let b = h.add(48.2, None);
    let c = h.add(48.3, None);

    for station in [&a, &b, &c] {
        assert!(h.pipeline.request_resolution(station, false));
    }
    assert_eq!(h.pipeline.pending(), 3);
    h.pipeline.drained().await;

    assert_eq!(h.resolutions(), vec!["48.1", "48.2", "48.3"]);
    assert_eq!(h.pipeline.pending(), 0);
}

#[tokio::test(start_paused = true)]
async fn resolutions_are_paced() {
    let pacing = PipelineConfig::default().pacing();
    let transport = MockTransport::new()
        .reply(LOCAL, 48.1, local_address("A"))
        .reply(FIRST, 48.3, json!({"display_name": "C"}));
    let h = Harness::new(transport);
    let stations: Vec<Station> = [48.1, 48.2, 48.3]
        .into_iter()
        .map(|lat| h.add(lat, None))
        .collect();

    for station in &stations {
        h.pipeline.request_resolution(station, false);
    }
    h.pipeline.drained().await;

    // Group calls per resolution: each starts at the primary provider
    let calls = h.calls();
    let mut groups: Vec<Vec<Call>> = Vec::new();
    for call in calls {
        if call.url == LOCAL {
            groups.push(Vec::new());
        }
        groups.last_mut().unwrap().push(call);
    }
    assert_eq!(groups.len(), 3);

    for pair in groups.windows(2) {
        let previous_end = pair[0].last().unwrap().end;
        let next_start = pair[1].first().unwrap().start;
        assert!(next_start.duration_since(previous_end) >= pacing);
    }
}

#[tokio::test(start_paused = true)]
async fn later_provider_wins_after_failures() {
    let transport = MockTransport::new()
        .reply(FIRST, 48.1, json!({"error": "Unable to geocode"}))
        .reply(
            SECOND,
            48.1,
            json!({"address": {"road": "Obchodná", "city": "Bratislava"}}),
        );
    let h = Harness::new(transport);
    let station = h.add(48.1, None);

    h.pipeline.request_resolution(&station, false);
    h.pipeline.drained().await;

    let stored = h.store.get(station.id).unwrap();
    assert_eq!(stored.address.as_deref(), Some("Obchodná, Bratislava"));
    assert!(!stored.address_requested);

    let urls: Vec<String> = h.calls().into_iter().map(|c| c.url).collect();
    assert_eq!(urls, vec![LOCAL, FIRST, SECOND]);
}

#[tokio::test(start_paused = true)]
async fn total_failure_writes_coordinate_label() {
    let h = Harness::new(MockTransport::new());
    let station = h.store.create(NewStation {
        center: Coordinates::new(48.1486, 17.1077),
        bikes: 0,
        capacity: 20,
        address: None,
    });

    h.pipeline.request_resolution(&station, false);
    h.pipeline.drained().await;

    let stored = h.store.get(station.id).unwrap();
    assert_eq!(stored.address.as_deref(), Some("48.1486°, 17.1077°"));
    assert!(!stored.address_requested);
    assert_eq!(h.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn deleted_station_is_skipped() {
    let transport = MockTransport::new().reply(LOCAL, 48.1, local_address("Gone"));
    let h = Harness::new(transport);
    let station = h.add(48.1, None);

    h.pipeline.request_resolution(&station, false);
    h.store.delete(station.id);
    h.pipeline.drained().await;

    // The work still ran, but nothing was written
    assert_eq!(h.resolutions().len(), 1);
    assert!(h.store.get(station.id).is_none());
    assert!(h.store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn recreated_id_is_not_left_flagged() {
    let h = Harness::new(MockTransport::new());
    let original = h.add(48.1, None);

    h.pipeline.request_resolution(&original, false);
    h.store.delete(original.id);
    let replacement = h.add(48.5, None);
    assert_eq!(replacement.id, original.id);
    h.pipeline.drained().await;

    let stored = h.store.get(replacement.id).unwrap();
    assert!(!stored.address_requested);
    assert_eq!(stored.address, None);
}

#[tokio::test(start_paused = true)]
async fn reused_id_keeps_its_own_request() {
    let transport = MockTransport::new()
        .reply(LOCAL, 48.1, local_address("Prvá"))
        .reply(LOCAL, 48.2, local_address("Stará"))
        .reply(LOCAL, 48.5, local_address("Nová"));
    let h = Harness::new(transport);
    let a = h.add(48.1, None);
    let b = h.add(48.2, None);

    assert!(h.pipeline.request_resolution(&a, false));
    assert!(h.pipeline.request_resolution(&b, false));

    // The highest id is handed out again
    h.store.delete(b.id);
    let reborn = h.add(48.5, None);
    assert_eq!(reborn.id, b.id);
    assert!(h.pipeline.request_resolution(&reborn, true));

    // The old request for this id has finished; the new one is still queued
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(h.resolutions(), vec!["48.1", "48.2"]);
    assert!(h.store.get(reborn.id).unwrap().address_requested);
    assert!(!h.pipeline.request_resolution(&reborn, true));
    assert_eq!(h.pipeline.pending(), 1);

    h.pipeline.drained().await;
    assert_eq!(h.resolutions(), vec!["48.1", "48.2", "48.5"]);
    let stored = h.store.get(reborn.id).unwrap();
    assert_eq!(stored.address.as_deref(), Some("Nová"));
    assert!(!stored.address_requested);
}

#[tokio::test(start_paused = true)]
async fn unchanged_reupload_keeps_result() {
    let lat = -21.711438059000002;
    let transport = MockTransport::new().reply(LOCAL, lat, local_address("Skutočná 3"));
    let h = Harness::new(transport);
    let station = h.add(lat, None);

    h.pipeline.request_resolution(&station, false);

    // The dashboard's copy comes back one ULP off after a JSON round trip
    let mut uploaded = h.store.get(station.id).unwrap();
    let center = uploaded.center.unwrap();
    uploaded.center = Some(Coordinates::new(
        f64::from_bits(center.lat.to_bits() + 1),
        center.lng,
    ));
    uploaded.address_requested = false;
    h.store.replace_all(vec![uploaded]);
    assert!(h.store.get(station.id).unwrap().address_requested);

    h.pipeline.drained().await;
    let stored = h.store.get(station.id).unwrap();
    assert_eq!(stored.address.as_deref(), Some("Skutočná 3"));
    assert!(!stored.address_requested);
}

/// Panics on every request.
struct PanickingTransport;

impl Transport for PanickingTransport {
    async fn get_json(&self, _request: &ProviderRequest) -> Result<Value, GeocodeError> {
        panic!("transport exploded");
    }
}

#[tokio::test(start_paused = true)]
async fn panicking_job_releases_claim() {
    let store = Arc::new(MemoryStationStore::new());
    let chain = ProviderChain::new(PanickingTransport)
        .with_primary(LocalProvider::new("http://local"));
    let pipeline = ResolutionPipeline::new(Arc::clone(&store), chain, &PipelineConfig::default());
    let station = store.create(NewStation {
        center: Coordinates::new(48.1, 17.1),
        bikes: 0,
        capacity: 20,
        address: None,
    });

    assert!(pipeline.request_resolution(&station, false));
    pipeline.drained().await;

    let stored = store.get(station.id).unwrap();
    assert!(!stored.address_requested);
    assert_eq!(stored.address, None);
    assert!(pipeline.request_resolution(&stored, false));
    pipeline.drained().await;
}

#[tokio::test(start_paused = true)]
async fn station_without_coordinates_is_ignored() {
    let h = Harness::new(MockTransport::new());
    let mut station = Station::new(StationId(9), Coordinates::new(0.0, 0.0), 0, 20);
    station.center = None;
    h.store.replace_all(vec![station.clone()]);

    assert!(!h.pipeline.request_resolution(&station, true));
    h.pipeline.drained().await;

    let stored = h.store.get(StationId(9)).unwrap();
    assert!(!stored.address_requested);
    assert_eq!(stored.address, None);
    assert!(h.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unknown_station_is_ignored() {
    let h = Harness::new(MockTransport::new());
    let stranger = Station::new(StationId(77), Coordinates::new(48.1, 17.1), 0, 20);

    assert!(!h.pipeline.request_resolution(&stranger, false));
    assert!(h.store.get(StationId(77)).is_none());
}

#[tokio::test(start_paused = true)]
async fn flag_set_while_queued() {
    let h = Harness::new(MockTransport::new());
    let a = h.add(48.1, None);
    let b = h.add(48.2, None);

    h.pipeline.request_resolution(&a, false);
    h.pipeline.request_resolution(&b, false);
    assert!(h.store.get(a.id).unwrap().address_requested);
    assert!(h.store.get(b.id).unwrap().address_requested);

    h.pipeline.drained().await;
    assert!(!h.store.get(a.id).unwrap().address_requested);
    assert!(!h.store.get(b.id).unwrap().address_requested);
}

#[test]
fn chain_keeps_provider_order() {
    let h = Harness::new(MockTransport::new());
    assert_eq!(
        h.pipeline.chain().provider_names(),
        vec!["local", "nominatim", "maps.co"]
    );
}
