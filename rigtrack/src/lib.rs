//! Calibration-based retargeting of 3D body landmarks onto a humanoid rig.
//!
//! The engine records, once, how each tracked body direction relates to the
//! rig's rest rotations, then converts every live landmark frame into bone
//! rotations. Pose detection, rendering and rig loading live with the host.

#![forbid(unsafe_code)]

mod calibration;
mod config;
mod error;
pub mod geometry;
mod landmark;
mod rig;
mod runtime;
mod tracking;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "binary")]
pub mod binary;

pub use calibration::*;
pub use config::*;
pub use error::*;
pub use landmark::*;
pub use rig::*;
pub use runtime::*;
pub use tracking::*;

#[cfg(test)]
mod test_support;
