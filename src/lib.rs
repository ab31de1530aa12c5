//! IRIS mission controls: swarm mission simulation over two-body dynamics.
//!
//! The workspace crates are re-exported here so front-ends and integration tests can
//! depend on a single library.

pub use iris_config as config;
pub use iris_core::{constants, logging, time, units, vector};
pub use iris_ephem as ephem;
pub use iris_export as export;
pub use iris_impulsive as impulsive;
pub use iris_insights as insights;
pub use iris_mission as mission;
pub use iris_orbits as orbits;
pub use iris_propulsion as propulsion;
pub use iris_store as store;
pub use iris_trajectory as trajectory;

/// Returns the version of the library for smoke tests.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
