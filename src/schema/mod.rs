//! Schema module - Shot, solver and scenario configuration types.

mod scene;
mod shot;
mod solver;

pub use scene::*;
pub use shot::*;
pub use solver::*;
