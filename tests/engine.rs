// End-to-end runs of the engine over small in-memory district sets.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::anyhow;
use gerryscore::{
    AreaModel, BoundaryDataProvider, CacheService, DiskProvider, DistrictSet, Engine, EngineConfig,
    EngineError, FeatureCollection, MemProvider, CHUNK_SIZE,
};

/// Provider wrapper that counts loads.
struct Counting<P> {
    inner: P,
    loads: AtomicUsize,
}

impl<P: BoundaryDataProvider> BoundaryDataProvider for Counting<P> {
    fn load_dataset(&self, path: &str) -> anyhow::Result<FeatureCollection> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load_dataset(path)
    }
}

/// Provider that always fails.
struct Unreachable;

impl BoundaryDataProvider for Unreachable {
    fn load_dataset(&self, path: &str) -> anyhow::Result<FeatureCollection> {
        Err(anyhow!("connection refused fetching {path}"))
    }
}

fn polygon_feature(id: &str, ring: &[(f64, f64)]) -> serde_json::Value {
    let coords: Vec<[f64; 2]> = ring.iter().map(|&(x, y)| [x, y]).collect();
    serde_json::json!({
        "type": "Feature",
        "properties": { "GEOID": id },
        "geometry": { "type": "Polygon", "coordinates": [coords] },
    })
}

fn collection(features: Vec<serde_json::Value>) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({ "type": "FeatureCollection", "features": features })).unwrap()
}

/// A 4x4 state: a compact square in the middle, a long strip along the
/// bottom edge, a U-shaped district, and a point that is not a district.
fn state_geojson() -> Vec<u8> {
    let features = vec![
        polygon_feature("square", &[(1.5, 1.5), (2.5, 1.5), (2.5, 2.5), (1.5, 2.5), (1.5, 1.5)]),
        polygon_feature("strip", &[(0.0, 0.0), (4.0, 0.0), (4.0, 0.5), (0.0, 0.5), (0.0, 0.0)]),
        polygon_feature("u-shape", &[
            (0.0, 1.0), (1.0, 1.0), (1.0, 3.0), (3.0, 3.0), (3.0, 1.0), (4.0, 1.0),
            (4.0, 4.0), (0.0, 4.0), (0.0, 1.0),
        ]),
        serde_json::json!({
            "type": "Feature",
            "properties": { "NAME": "capital" },
            "geometry": { "type": "Point", "coordinates": [2.0, 2.0] },
        }),
    ];
    collection(features)
}

fn planar_config() -> EngineConfig {
    EngineConfig { area_model: AreaModel::Planar, ..EngineConfig::default() }
}

fn counting_engine() -> Engine<Counting<MemProvider>> {
    let mut provider = MemProvider::default();
    provider.insert(DistrictSet::CongressionalDistricts.dataset_path(), state_geojson());
    Engine::new(Counting { inner: provider, loads: AtomicUsize::new(0) }, planar_config())
}

#[test]
fn enhanced_report_covers_every_district() {
    let engine = counting_engine();
    let report = engine.compute_district_compactness("congressional-districts", true, false).unwrap();

    assert_eq!(report.district_type, DistrictSet::CongressionalDistricts);
    assert!(!report.cached);
    assert_eq!(report.batch.scores.keys().collect::<Vec<_>>(), vec!["square", "strip", "u-shape"]);

    let detailed = report.batch.detailed.as_ref().unwrap();
    for (id, result) in detailed {
        assert!((0.0..=1.0).contains(&result.polsby_popper), "{id}");
        assert!((0.0..=1.0).contains(&result.convex_hull_ratio), "{id}");
        assert!(result.adjusted_score >= result.polsby_popper, "{id}");
        assert!(result.adjusted_score <= 1.0, "{id}");
        assert_eq!(report.batch.scores[id], result.adjusted_score);
    }

    // The square sits in the interior; the strip and the U touch the state's edge.
    assert!(!detailed["square"].boundary_context.has_border);
    assert!((detailed["square"].polsby_popper - std::f64::consts::PI / 4.0).abs() < 1e-12);
    assert_eq!(detailed["square"].adjusted_score, detailed["square"].polsby_popper);
    assert!(detailed["strip"].boundary_context.has_border);
    assert!(detailed["strip"].boundary_context.has_coastline);
    assert!((detailed["u-shape"].convex_hull_ratio - 8.0 / 12.0).abs() < 1e-12);

    let summary = report.batch.geographic_summary.unwrap();
    assert_eq!(summary.border_districts, 2);
    assert_eq!(report.batch.statistics.total_districts, 3);
}

#[test]
fn basic_mode_has_no_breakdown() {
    let engine = counting_engine();
    let report = engine.compute_district_compactness("congressional-districts", false, false).unwrap();
    assert!(report.batch.detailed.is_none());
    assert!(report.batch.geographic_summary.is_none());
    assert!((report.batch.scores["square"] - std::f64::consts::PI / 4.0).abs() < 1e-12);
}

#[test]
fn repeated_call_hits_the_result_cache() {
    let engine = counting_engine();
    let first = engine.compute_district_compactness("congressional-districts", true, false).unwrap();
    let second = engine.compute_district_compactness("congressional-districts", true, false).unwrap();

    assert!(second.cached);
    assert_eq!(
        serde_json::to_string(&first.batch).unwrap(),
        serde_json::to_string(&second.batch).unwrap(),
    );
    assert_eq!(engine.provider().loads.load(Ordering::SeqCst), 1);
}

#[test]
fn skip_cache_always_recomputes() {
    let engine = counting_engine();
    let first = engine.compute_district_compactness("congressional-districts", true, true).unwrap();
    let second = engine.compute_district_compactness("congressional-districts", true, true).unwrap();
    assert!(!first.cached && !second.cached);
    assert_eq!(first.batch, second.batch);

    // The fresh result is still written through.
    let third = engine.compute_district_compactness("congressional-districts", true, false).unwrap();
    assert!(third.cached);
}

#[test]
fn enhanced_and_basic_are_cached_separately() {
    let engine = counting_engine();
    engine.compute_district_compactness("congressional-districts", true, false).unwrap();
    let basic = engine.compute_district_compactness("congressional-districts", false, false).unwrap();
    assert!(!basic.cached);
    assert_eq!(
        engine.cache().keys(Some("gerry:*")),
        vec!["gerry:congressional-districts:false", "gerry:congressional-districts:true"],
    );
    // Both computations share one dataset load.
    assert_eq!(engine.provider().loads.load(Ordering::SeqCst), 1);
}

#[test]
fn results_are_deterministic_across_engines() {
    let a = counting_engine().compute_district_compactness("congressional-districts", true, false).unwrap();
    let b = counting_engine().compute_district_compactness("congressional-districts", true, false).unwrap();
    assert_eq!(
        serde_json::to_vec(&a.batch).unwrap(),
        serde_json::to_vec(&b.batch).unwrap(),
    );
}

#[test]
fn invalid_key_is_rejected_before_loading() {
    let engine = counting_engine();
    let err = engine.compute_district_compactness("county-districts", true, false).unwrap_err();
    assert!(matches!(err, EngineError::InvalidDistrictSet(_)));
    assert!(err.is_caller_error());

    let err = engine.compute_district_compactness("", true, false).unwrap_err();
    assert!(matches!(err, EngineError::MissingDistrictSet));
    assert_eq!(engine.provider().loads.load(Ordering::SeqCst), 0);
}

#[test]
fn load_failure_names_key_and_path_and_caches_nothing() {
    let engine = Engine::new(Unreachable, planar_config());
    let err = engine.compute_district_compactness("state-lower-districts", true, false).unwrap_err();

    let EngineError::DatasetLoad { key, path, .. } = &err else { panic!("unexpected error: {err}") };
    assert_eq!(key, "state-lower-districts");
    assert_eq!(path, "/districts/state-lower-districts.geojson");
    assert!(err.to_string().contains("connection refused"));
    assert!(!err.is_caller_error());
    assert!(engine.cache().keys(None).is_empty());
}

#[test]
fn yields_between_chunks() {
    let features = (0..2 * CHUNK_SIZE + 1)
        .map(|i| {
            let x = i as f64;
            polygon_feature(&format!("d{i:03}"), &[(x, 0.0), (x + 1.0, 0.0), (x + 1.0, 1.0), (x, 1.0), (x, 0.0)])
        })
        .collect();
    let mut provider = MemProvider::default();
    provider.insert(DistrictSet::CongressionalDistricts.dataset_path(), collection(features));
    let engine = Engine::new(provider, planar_config());

    let mut yields = 0;
    let report = engine.compute_with_yield("congressional-districts", false, true, || yields += 1).unwrap();
    // Three chunks, two yield points.
    assert_eq!(yields, 2);
    assert_eq!(report.batch.scores.len(), 2 * CHUNK_SIZE + 1);
}

#[test]
fn winding_does_not_change_geodesic_scores() {
    let ccw = [(0.0, 0.0), (2.0, 0.0), (2.0, 0.1), (0.0, 0.1), (0.0, 0.0)];
    let mut cw = ccw;
    cw.reverse();
    let mut provider = MemProvider::default();
    provider.insert(
        DistrictSet::CongressionalDistricts.dataset_path(),
        collection(vec![
            polygon_feature("ccw", &ccw),
            polygon_feature("cw", &cw),
            polygon_feature("block", &[(0.0, 0.5), (1.0, 0.5), (1.0, 1.5), (0.0, 1.5), (0.0, 0.5)]),
        ]),
    );
    let engine = Engine::new(provider, EngineConfig::default());
    let report = engine.compute_district_compactness("congressional-districts", true, false).unwrap();

    let detailed = report.batch.detailed.as_ref().unwrap();
    let (ccw, cw) = (&detailed["ccw"], &detailed["cw"]);
    assert!(cw.polsby_popper < 0.2, "cw polsby-popper = {}", cw.polsby_popper);
    assert!((ccw.polsby_popper - cw.polsby_popper).abs() < 1e-9);
    assert!((ccw.convex_hull_ratio - cw.convex_hull_ratio).abs() < 1e-9);
    assert!((report.batch.scores["ccw"] - report.batch.scores["cw"]).abs() < 1e-9);
    assert!(report.batch.scores["cw"] < 1.0);
}

#[test]
fn engines_can_share_a_cache() {
    let cache = Arc::new(CacheService::default());
    let mut provider = MemProvider::default();
    provider.insert(DistrictSet::CongressionalDistricts.dataset_path(), state_geojson());

    let first = Engine::with_cache(provider.clone(), planar_config(), cache.clone());
    let second = Engine::with_cache(provider, planar_config(), cache.clone());
    first.compute_district_compactness("congressional-districts", true, false).unwrap();
    assert!(second.compute_district_compactness("congressional-districts", true, false).unwrap().cached);

    cache.clear_all();
    assert!(!second.compute_district_compactness("congressional-districts", true, false).unwrap().cached);
}

#[test]
fn disk_provider_feeds_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("districts")).unwrap();
    std::fs::write(dir.path().join("districts/state-upper-districts.geojson"), state_geojson()).unwrap();

    let engine = Engine::new(DiskProvider::new(dir.path()), planar_config());
    let report = engine.compute_district_compactness("state-upper-districts", true, false).unwrap();
    assert_eq!(report.batch.scores.len(), 3);

    let diagnosis = engine.diagnose(DistrictSet::StateLowerDistricts);
    assert!(!diagnosis.success);
}
