pub mod logic;

pub use logic::run::{run_team, RunClients, RunSummary};
