//! Impulsive transfer utilities: classical two-impulse transfer geometry.

pub mod transfers;

pub use transfers::{HohmannTransfer, TransferError, hohmann};
