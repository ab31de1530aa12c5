use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use iris_controls::config::{Settings, load_bodies, load_settings};
use iris_controls::constants::AU_KM;
use iris_controls::ephem::{Ephemeris, KeplerianEphemeris};
use iris_controls::mission::{MissionSimulator, SimulationError};
use iris_controls::store::{
    FileStore, MissionId, MissionParameters, MissionRecord, StoreError, TrajectoryStore,
};
use iris_controls::time::FixedClock;

fn borisov_params() -> MissionParameters {
    MissionParameters {
        target_name: "2I/Borisov".to_string(),
        intercept_epoch: 2_458_765.5,
        swarm_size: 12,
        role_split: "balanced".to_string(),
        propulsion_type: "chemical".to_string(),
    }
}

fn simulator(store: Arc<dyn TrajectoryStore>) -> MissionSimulator {
    let catalog = load_bodies("configs/bodies").expect("body catalog");
    let settings = load_settings("configs/settings.toml").expect("settings");
    let ephemeris = Arc::new(KeplerianEphemeris::new(catalog.clone()));
    let clock = Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap()));
    MissionSimulator::new(settings, catalog, ephemeris, store, clock)
}

/// File store that remembers the last record it was asked to create.
struct Recording {
    inner: FileStore,
    last: Mutex<Option<MissionRecord>>,
}

impl TrajectoryStore for Recording {
    fn create(&self, record: &MissionRecord) -> Result<MissionId, StoreError> {
        *self.last.lock().unwrap() = Some(record.clone());
        self.inner.create(record)
    }

    fn read(&self, id: &MissionId) -> Result<MissionRecord, StoreError> {
        self.inner.read(id)
    }

    fn list(&self) -> Result<Vec<MissionId>, StoreError> {
        self.inner.list()
    }
}

#[test]
fn shipped_configuration_loads() {
    let catalog = load_bodies("configs/bodies").expect("body catalog");
    for name in ["SUN", "EARTH", "MARS", "JUPITER", "Borisov", "2I/Borisov"] {
        assert!(catalog.find(name).is_some(), "{name}");
    }
    let settings = load_settings("configs/settings.toml").expect("settings");
    assert_eq!(settings.simulation.point_count, 100);
    assert_eq!(settings, Settings::default());
}

#[test]
fn catalog_ephemeris_places_planets_at_their_distances() {
    let catalog = load_bodies("configs/bodies").unwrap();
    let ephemeris = KeplerianEphemeris::new(catalog);
    let epoch = Utc.with_ymd_and_hms(2019, 10, 9, 0, 0, 0).unwrap();
    for (body, min_au, max_au) in [
        ("MERCURY", 0.30, 0.47),
        ("VENUS", 0.71, 0.73),
        ("EARTH", 0.98, 1.02),
        ("MARS", 1.38, 1.67),
        ("JUPITER", 4.95, 5.46),
        ("SATURN", 9.0, 10.1),
    ] {
        let state = ephemeris.state_at(body, "SUN", epoch).unwrap();
        let au = state.radius_km() / AU_KM;
        assert!((min_au..=max_au).contains(&au), "{body}: {au}");
    }
}

#[test]
fn borisov_mission_round_trips_through_the_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Recording {
        inner: FileStore::open(dir.path()).unwrap(),
        last: Mutex::new(None),
    });
    let sim = simulator(store.clone());

    let summary = sim.run_simulation(&borisov_params()).unwrap();
    assert_eq!(summary.mission_id.as_str(), "mission_20261019_090000_000");
    assert_eq!(summary.point_count, 100);

    let written = store.last.lock().unwrap().clone().unwrap();
    let record = sim.retrieve(&summary.mission_id, None).unwrap();
    assert_eq!(record, written);
    // A fresh handle on the same directory decodes the same bytes.
    let reopened = FileStore::open(dir.path()).unwrap();
    assert_eq!(reopened.read(&summary.mission_id).unwrap(), written);
    assert_eq!(record.parameters, borisov_params());
    assert_eq!(record.calculations, summary.calculations);

    let step = (record.trajectory[1].datetime - record.trajectory[0].datetime)
        .num_nanoseconds()
        .unwrap();
    for (i, point) in record.trajectory.iter().enumerate() {
        let offset = (point.datetime - record.trajectory[0].datetime)
            .num_nanoseconds()
            .unwrap();
        assert!((offset - i as i64 * step).abs() <= 1_000, "point {i}");
        let norm = (point.x.powi(2) + point.y.powi(2) + point.z.powi(2)).sqrt();
        assert!((point.distance - norm).abs() <= 1e-6 * norm);
    }

    // A second run in the same second gets the next sequence number.
    let second = sim.run_simulation(&borisov_params()).unwrap();
    assert_eq!(second.mission_id.as_str(), "mission_20261019_090000_001");
    assert_eq!(sim.list_missions().unwrap().len(), 2);
}

#[test]
fn unknown_mission_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let sim = simulator(Arc::new(FileStore::open(dir.path()).unwrap()));
    let id = MissionId::parse("mission_19991231_235959_000").unwrap();
    assert!(matches!(
        sim.retrieve(&id, Some(3)),
        Err(SimulationError::Store(StoreError::NotFound(_)))
    ));
}

#[test]
fn stored_records_serialize_with_wire_names() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let sim = simulator(store.clone());
    let summary = sim.run_simulation(&borisov_params()).unwrap();

    let raw = std::fs::read(store.path_for(&summary.mission_id)).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    for key in ["mission_id", "parameters", "calculations", "trajectory"] {
        assert!(json.get(key).is_some(), "{key}");
    }
    for key in ["delta_v", "time_of_flight", "fuel_required"] {
        assert!(json["calculations"][key].is_number(), "{key}");
    }
    assert_eq!(json["trajectory"][0]["source"], "kepler_universal_variable");
}

#[test]
fn version_is_exposed() {
    assert!(!iris_controls::version().is_empty());
}
