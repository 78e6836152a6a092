//! Compute module - camera model, subject visibility, shot scoring and search.

mod camera;
mod error;
mod operator;
mod property;
mod proxy;
mod scene;
mod shot;
mod subject;

pub mod solver;

pub use camera::*;
pub use error::*;
pub use operator::*;
pub use property::*;
pub use proxy::*;
pub use scene::*;
pub use shot::*;
pub use solver::{
    Candidate, GeneticAlgorithm, Greedy, HillClimber, ParticleSwarm, Pose, PoseRng,
    PotentialField, SearchContext, SearchStrategy, Solver, SolverState, Trace, TraceSample,
};
pub use subject::*;
