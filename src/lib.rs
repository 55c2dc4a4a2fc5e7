//! A decision procedure for linear arithmetic over piecewise-linear
//! constraints: build an `InputProblem`, hand it to `solve` (or drive
//! `core::Engine` directly), get back SAT with a satisfying assignment,
//! UNSAT, or a timeout.
//!
//! There is no file format or CLI surface here -- the crate is invoked as a
//! library. `main.rs` is a thin smoke-test executable over a couple of
//! hand-built problems, not a front-end.

#[macro_use]
extern crate log;

pub mod config;
pub mod core;
pub mod error;
pub mod input;
pub(crate) mod util;

pub use crate::config::EngineSettings;
pub use crate::core::{solve, Engine, EngineStats, Solution, Status};
pub use crate::error::{EngineError, EngineResult};
pub use crate::input::InputProblem;
