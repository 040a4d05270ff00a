#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Tank lever engine (hardware-agnostic).
//!
//! Maps the angles of named control hinges to drive rotor velocities and a
//! shared gear ratio, and reports what it did as status text. All device
//! access goes through the port traits of `tank_traits`.
//!
//! ## Architecture
//!
//! - **Tags**: label vocabulary and exact-token matching (`tags` module)
//! - **Discovery**: one-shot classification of the construct into a `Registry`
//! - **Engine**: per-tick deadzone, gear and speed mapping with a change gate (`Tank`)
//! - **Status**: per-channel status text and its routing to displays
//! - **Runner**: scheduler driving `Tank::tick` through a `Clock`
//!
//! ## Units
//!
//! Hinges report radians; everything past the read is in degrees, folded into
//! (-180, 180]. Rotor commands are in rpm.

pub mod builder;
pub mod config;
pub mod conversions;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod registry;
pub mod runner;
pub mod status;
pub mod tags;
pub mod util;

pub use builder::{Missing, TankBuilder, build_tank};
pub use config::{EngineCfg, ScheduleCfg};
pub use discovery::{DiscoveryReport, DiscoveryWarning, discover};
pub use engine::{EngineState, Tank};
pub use error::{BuildError, Report, Result, TankError};
pub use registry::{Channel, DisplayFilter, DriveGroup, Registry};
pub use runner::{RunParams, RunSummary, TickObserver};
pub use status::{LeverReport, StatusBuffers, TickReport};
