pub mod accessibility;
pub mod aggregation;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod forcing;
pub mod grid;
pub mod growth;
pub mod metrics;
pub mod mortality;
pub mod population;
pub mod predation;
pub mod reproduction;
pub mod rng;
pub mod scheduler;
pub mod school;
pub mod species;
pub mod world;

pub use config::{MortalityAlgorithm, SimConfig};
pub use forcing::{Forcing, UniformForcing};
pub use metrics::{RunSummary, SchoolSnapshot, SpeciesIndicators, StepSummary};
pub use mortality::{DeathCounts, MortalityCause};
pub use world::{Simulation, SimulationError};
