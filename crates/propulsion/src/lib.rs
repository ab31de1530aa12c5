//! Propulsion modes and swarm mass properties.

use std::collections::BTreeMap;

use iris_config::PropulsionConfig;
use iris_core::constants::G0;
use iris_core::units::kms_to_ms;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PropulsionError {
    #[error("unknown propulsion type '{0}'")]
    Unknown(String),
    #[error("{name} must be positive and finite (got {value})")]
    InvalidInput { name: &'static str, value: f64 },
}

/// A named propulsion mode characterised by its specific impulse.
#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    pub name: String,
    pub isp_seconds: f64,
}

impl Engine {
    /// Effective exhaust velocity in km/s.
    pub fn exhaust_velocity_km_s(&self) -> f64 {
        self.isp_seconds * G0 / 1000.0
    }
}

/// Lookup table of propulsion modes keyed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct EngineCatalog {
    engines: BTreeMap<String, Engine>,
}

/// `"Nuclear-Thermal"` and `"nuclear thermal"` both resolve to `nuclear_thermal`.
pub fn normalize_propulsion_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

impl EngineCatalog {
    pub fn from_settings(entries: &BTreeMap<String, PropulsionConfig>) -> Self {
        let engines = entries
            .iter()
            .map(|(name, cfg)| {
                let key = normalize_propulsion_name(name);
                let engine = Engine {
                    name: key.clone(),
                    isp_seconds: cfg.isp_seconds,
                };
                (key, engine)
            })
            .collect();
        Self { engines }
    }

    pub fn find(&self, name: &str) -> Result<&Engine, PropulsionError> {
        self.engines
            .get(&normalize_propulsion_name(name))
            .ok_or_else(|| PropulsionError::Unknown(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }
}

/// A single craft of the swarm; every craft is modelled identically.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub dry_mass_kg: f64,
    pub engine: Engine,
}

impl Vehicle {
    /// Propellant needed to deliver `delta_v_km_s`, from the rocket equation
    /// `m_p = m_dry (exp(dv / (Isp g0)) - 1)`.
    pub fn propellant_for(&self, delta_v_km_s: f64) -> Result<f64, PropulsionError> {
        if !(self.dry_mass_kg > 0.0 && self.dry_mass_kg.is_finite()) {
            return Err(PropulsionError::InvalidInput {
                name: "dry mass",
                value: self.dry_mass_kg,
            });
        }
        if !(self.engine.isp_seconds > 0.0 && self.engine.isp_seconds.is_finite()) {
            return Err(PropulsionError::InvalidInput {
                name: "specific impulse",
                value: self.engine.isp_seconds,
            });
        }
        if !(delta_v_km_s >= 0.0 && delta_v_km_s.is_finite()) {
            return Err(PropulsionError::InvalidInput {
                name: "delta-v",
                value: delta_v_km_s,
            });
        }
        let exhaust_m_s = self.engine.isp_seconds * G0;
        let mass_ratio = (kms_to_ms(delta_v_km_s) / exhaust_m_s).exp();
        Ok(self.dry_mass_kg * (mass_ratio - 1.0))
    }
}

/// Total propellant across `swarm_size` identical craft.
pub fn swarm_propellant_kg(
    vehicle: &Vehicle,
    swarm_size: u32,
    delta_v_km_s: f64,
) -> Result<f64, PropulsionError> {
    Ok(f64::from(swarm_size) * vehicle.propellant_for(delta_v_km_s)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chemical() -> Engine {
        Engine {
            name: "chemical".to_string(),
            isp_seconds: 320.0,
        }
    }

    #[test]
    fn rocket_equation_matches_closed_form() {
        let vehicle = Vehicle {
            dry_mass_kg: 4.0,
            engine: chemical(),
        };
        let dv = 3.0;
        let expected = 4.0 * ((dv * 1000.0 / (320.0 * G0)).exp() - 1.0);
        let got = vehicle.propellant_for(dv).unwrap();
        assert!((got - expected).abs() < 1e-12);
        assert_eq!(vehicle.propellant_for(0.0).unwrap(), 0.0);
    }

    #[test]
    fn swarm_total_scales_linearly() {
        let vehicle = Vehicle {
            dry_mass_kg: 4.0,
            engine: chemical(),
        };
        let one = swarm_propellant_kg(&vehicle, 1, 2.5).unwrap();
        let twelve = swarm_propellant_kg(&vehicle, 12, 2.5).unwrap();
        assert!((twelve - 12.0 * one).abs() < 1e-9);
    }

    #[test]
    fn catalog_lookup_normalizes_names() {
        let mut entries = BTreeMap::new();
        entries.insert(
            "nuclear_thermal".to_string(),
            PropulsionConfig { isp_seconds: 900.0 },
        );
        let catalog = EngineCatalog::from_settings(&entries);
        assert_eq!(catalog.find("Nuclear-Thermal").unwrap().isp_seconds, 900.0);
        assert!(matches!(
            catalog.find("warp"),
            Err(PropulsionError::Unknown(name)) if name == "warp"
        ));
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["nuclear_thermal"]);
    }

    #[test]
    fn invalid_delta_v_is_rejected() {
        let vehicle = Vehicle {
            dry_mass_kg: 4.0,
            engine: chemical(),
        };
        assert!(vehicle.propellant_for(-1.0).is_err());
        assert!(vehicle.propellant_for(f64::INFINITY).is_err());
    }
}
