//! # Strata Engine
//!
//! Runtime around the Strata world index.
//!
//! This crate ties the world to its two execution contexts:
//! - Simulation: fixed-step entity integration and host-driven shifting
//! - Render: distance culling against a copied-out camera snapshot
//! - Camera sharing between the two under a minimal lock scope
//! - Configuration and frame timing for the `strata` binary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod camera;
pub mod camera_share;
pub mod config;
pub mod render;
pub mod simulation;
pub mod timing;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::camera::*;
    pub use crate::camera_share::*;
    pub use crate::config::*;
    pub use crate::render::*;
    pub use crate::simulation::*;
    pub use crate::timing::*;
}

pub use prelude::*;
