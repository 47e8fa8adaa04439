//! Organization license tiers and the license gate.
//!
//! Each organization holds one tier per service. The tiers travel inside the
//! access token, so the gate decides without any store lookup.

pub mod gate;
pub mod tier;

pub use gate::LicenseGate;
pub use tier::{LicenseTier, UnknownTier};
