//! Trial Runner: executes one `(agent, scenario, model, trialNumber)`
//! tuple to completion and returns a [`agentuse_model::TrialResult`],
//! never propagating an error out of the public entry point — every
//! failure mode becomes part of the result itself.

pub mod cancellation;
pub mod context;
pub mod cost;
pub mod runner;
pub mod scratch;

pub use cancellation::CooperativeCancellationToken;
pub use cost::CostBudgetTracker;
pub use runner::{run_trial, TrialDeps, TrialRequest};
pub use scratch::ScratchDir;
