//! Suite Loader: resolves a suite name to a file, parses its YAML
//! descriptor, validates the cross-field invariants the wire format
//! cannot express, and loads the agent file each test references.
//!
//! ```rust,no_run
//! use agentuse_suite::SuiteLoader;
//!
//! let loader = SuiteLoader::new("suites", "examples/suites");
//! let loaded = loader.load("coding-bench")?;
//! assert!(!loaded.suite.tests.is_empty());
//! # Ok::<(), agentuse_suite::SuiteLoadError>(())
//! ```

pub mod agent_file;
pub mod error;
pub mod loader;
pub mod resolve;
pub mod substitution;
pub mod validate;

pub use agent_file::{load_agent_file, parse_agent_file};
pub use error::SuiteLoadError;
pub use loader::{LoadedSuite, SuiteLoader};
pub use resolve::resolve_suite_path;
pub use substitution::substitute_dynamic_variables;
pub use validate::validate_suite;
