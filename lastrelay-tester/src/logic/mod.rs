pub mod policy;
pub mod reports;
pub mod scenario;
pub mod script;
pub mod seeds;
pub mod simulation;
pub mod tester;

pub use policy::GameplayStrategy;
pub use scenario::{get_scenario, list_scenarios};
pub use script::run_script;
pub use seeds::resolve_seed_inputs;
pub use tester::*;
