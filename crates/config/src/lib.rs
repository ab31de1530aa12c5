//! Configuration models and loaders for the IRIS mission workspace.
//!
//! Two kinds of input are handled here: the body catalog (one TOML file per body in a
//! directory, or a single YAML list) and the run-time [`Settings`] that replace the
//! process-wide credential and constant state of earlier tooling.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use iris_core::units::au_to_km;
use serde::Deserialize;
use thiserror::Error;

/// Celestial body entry parsed from the catalog.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BodyConfig {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Gravitational parameter; zero for bodies too small to act as a central body.
    #[serde(default)]
    pub mu_km3_s2: f64,
    #[serde(default)]
    pub radius_km: f64,
    #[serde(default)]
    pub orbit: Option<OrbitConfig>,
}

/// Osculating elements of a body about its parent at `epoch_jd`.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OrbitConfig {
    pub parent: String,
    #[serde(default)]
    pub semi_major_axis_au: Option<f64>,
    #[serde(default)]
    pub periapsis_au: Option<f64>,
    pub eccentricity: f64,
    #[serde(default)]
    pub inclination_deg: f64,
    #[serde(default)]
    pub raan_deg: f64,
    #[serde(default)]
    pub arg_periapsis_deg: f64,
    #[serde(default)]
    pub mean_anomaly_deg: f64,
    #[serde(default = "default_elements_epoch")]
    pub epoch_jd: f64,
}

fn default_elements_epoch() -> f64 {
    2_451_545.0
}

impl OrbitConfig {
    /// True for closed (elliptical) orbits.
    pub fn is_bound(&self) -> bool {
        self.eccentricity < 1.0
    }

    /// Periapsis distance in km, derived from the semi-major axis when not given directly.
    pub fn periapsis_km(&self) -> Option<f64> {
        match (self.periapsis_au, self.semi_major_axis_au) {
            (Some(q), _) => Some(au_to_km(q)),
            (None, Some(a)) if self.is_bound() => Some(au_to_km(a * (1.0 - self.eccentricity))),
            _ => None,
        }
    }

    /// Semi-major axis in km for bound orbits.
    pub fn semi_major_axis_km(&self) -> Option<f64> {
        if !self.is_bound() {
            return None;
        }
        match (self.semi_major_axis_au, self.periapsis_au) {
            (Some(a), _) => Some(au_to_km(a)),
            (None, Some(q)) => Some(au_to_km(q / (1.0 - self.eccentricity))),
            _ => None,
        }
    }

    /// Radius used for transfer geometry: semi-major axis when bound, periapsis otherwise.
    pub fn reference_radius_km(&self) -> Option<f64> {
        if self.is_bound() {
            self.semi_major_axis_km()
        } else {
            self.periapsis_km()
        }
    }
}

/// Loaded body catalog with case-insensitive lookup over names and aliases.
#[derive(Debug, Clone, Default)]
pub struct BodyCatalog {
    bodies: Vec<BodyConfig>,
}

impl BodyCatalog {
    pub fn new(bodies: Vec<BodyConfig>) -> Self {
        Self { bodies }
    }

    pub fn find(&self, name: &str) -> Option<&BodyConfig> {
        let wanted = name.trim().to_uppercase();
        self.bodies.iter().find(|body| {
            body.name.to_uppercase() == wanted
                || body.aliases.iter().any(|alias| alias.to_uppercase() == wanted)
        })
    }

    pub fn bodies(&self) -> &[BodyConfig] {
        &self.bodies
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Run-time settings passed explicitly into the simulator and the insights collaborator.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub simulation: SimulationConfig,
    pub transfer: TransferConfig,
    pub swarm: SwarmConfig,
    pub propulsion: BTreeMap<String, PropulsionConfig>,
    pub store: StoreConfig,
    pub insights: InsightsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        let propulsion = [
            ("chemical", 320.0),
            ("cold_gas", 70.0),
            ("electric", 3_000.0),
            ("nuclear_thermal", 900.0),
        ]
        .into_iter()
        .map(|(name, isp)| (name.to_string(), PropulsionConfig { isp_seconds: isp }))
        .collect();

        Self {
            simulation: SimulationConfig::default(),
            transfer: TransferConfig::default(),
            swarm: SwarmConfig::default(),
            propulsion,
            store: StoreConfig::default(),
            insights: InsightsConfig::default(),
        }
    }
}

impl Settings {
    /// Resolve the insights API key from the environment variable named in the settings.
    ///
    /// Called once at start-up; the key then travels with the settings value.
    pub fn with_env_credentials(mut self) -> Self {
        self.insights.api_key = std::env::var(&self.insights.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        self
    }

    /// Reject settings that would only fail later inside the numerical pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.point_count < 1 {
            return Err(ConfigError::Invalid(format!(
                "simulation.point_count must be at least 1 (got {})",
                self.simulation.point_count
            )));
        }
        if let TimeOfFlightPolicy::Fixed { days } = self.transfer.time_of_flight {
            if !(days.is_finite() && days >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "transfer.time_of_flight.days must be a non-negative number (got {days})"
                )));
            }
        }
        if !(self.swarm.dry_mass_per_craft_kg.is_finite() && self.swarm.dry_mass_per_craft_kg > 0.0)
        {
            return Err(ConfigError::Invalid(
                "swarm.dry_mass_per_craft_kg must be positive".to_string(),
            ));
        }
        for (name, propulsion) in &self.propulsion {
            if !(propulsion.isp_seconds.is_finite() && propulsion.isp_seconds > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "propulsion.{name}.isp_seconds must be positive"
                )));
            }
        }
        Ok(())
    }
}

/// Pipeline knobs for the simulator.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub central_body: String,
    pub departure_body: String,
    /// Points per recorded trajectory. Signed so that bad input is reported, not wrapped.
    pub point_count: i64,
    /// Leading points echoed to the log when a trajectory is retrieved.
    pub retrieval_sample: usize,
    pub orbit_track_points: i64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            central_body: "SUN".to_string(),
            departure_body: "EARTH".to_string(),
            point_count: 100,
            retrieval_sample: 3,
            orbit_track_points: 200,
        }
    }
}

/// How time of flight and the departure burn are chosen.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct TransferConfig {
    pub time_of_flight: TimeOfFlightPolicy,
    pub burn: BurnPolicy,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum TimeOfFlightPolicy {
    /// Half the period of the Hohmann ellipse between departure and target radii.
    #[default]
    Hohmann,
    /// Operator-supplied duration (e.g. the historical 280-day cruise).
    Fixed { days: f64 },
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum BurnPolicy {
    /// First Hohmann impulse along the departure velocity.
    #[default]
    Hohmann,
    /// Fixed inertial delta-v vector (e.g. the historical `[0, 0.5, 0]` km/s).
    Fixed { delta_v_km_s: [f64; 3] },
}

/// Mass properties shared by every craft in the swarm.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SwarmConfig {
    pub dry_mass_per_craft_kg: f64,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            dry_mass_per_craft_kg: 4.0,
        }
    }
}

/// Propulsion catalog entry keyed by the mission's `propulsion_type`.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct PropulsionConfig {
    pub isp_seconds: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub directory: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("trajectories"),
        }
    }
}

/// Text-generation collaborator settings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InsightsConfig {
    pub endpoint: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
    /// Filled by [`Settings::with_env_credentials`]; never read from files.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 20,
            api_key: None,
        }
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load the body catalog from a directory of TOML files or a YAML list.
pub fn load_bodies<P: AsRef<Path>>(path: P) -> Result<BodyCatalog, ConfigError> {
    let bodies: Vec<BodyConfig> = load_records(path)?;
    for body in &bodies {
        if let Some(orbit) = &body.orbit {
            if orbit.reference_radius_km().is_none() {
                return Err(ConfigError::Invalid(format!(
                    "body '{}' needs semi_major_axis_au or periapsis_au",
                    body.name
                )));
            }
        }
    }
    Ok(BodyCatalog::new(bodies))
}

/// Load settings from a TOML (or YAML) file and validate them.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let settings: Settings = if is_toml(path) {
        toml::from_str(&std::fs::read_to_string(path)?)?
    } else {
        serde_yaml::from_reader(File::open(path)?)?
    };
    settings.validate()?;
    Ok(settings)
}

fn load_records<T, P>(path: P) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if path.is_dir() {
        read_dir_records(path)
    } else if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        let record: T = toml::from_str(&contents)?;
        Ok(vec![record])
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn read_dir_records<T>(dir: &Path) -> Result<Vec<T>, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut records = Vec::new();
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path))
        .collect();
    entries.sort();
    for path in entries {
        let contents = std::fs::read_to_string(&path)?;
        let record: T = toml::from_str(&contents)?;
        records.push(record);
    }
    Ok(records)
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}
