pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod output;
pub mod policies;
pub mod router;
pub mod state;
pub mod stats;
pub mod sweep;
pub mod variates;

pub use engine::{run_simulation, simulate};
