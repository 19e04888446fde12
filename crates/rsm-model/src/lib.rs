//! RSM Model
//!
//! Scenario model for robust treatment planning: owns the uncertainty
//! parameters and an enumeration policy, keeps the scenario table and index
//! space in sync with them, and answers lookups by scenario number or
//! `(ct, shift, range)` subscript.
//!
//! # Architecture
//!
//! ```text
//! ModelConfig ──► ScenarioModel ──► ScenarioPolicy::enumerate
//!                      │                     │
//!                      │◄── ScenarioTable ◄──┤
//!                      │◄── ScenarioIndexSpace
//!                      ▼
//!         extract_single_scenario ──► ScenarioModel (SingleScenario)
//! ```
//!
//! # Example
//!
//! ```rust
//! use rsm_model::ScenarioModel;
//! use rsm_strategy::WorstCaseScenarios;
//!
//! let mut model = ScenarioModel::new(WorstCaseScenarios::new(), 2).unwrap();
//! assert_eq!(model.total_scenarios(), 18);
//!
//! // Rejected values leave the model untouched
//! assert!(model.set_shift_sd(&[1.0, 2.0]).is_err());
//! assert_eq!(model.total_scenarios(), 18);
//!
//! let single = model.extract_single_scenario(5).unwrap();
//! assert_eq!(single.scen_for_prob()[0], model.scen_for_prob()[4]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod extract;
mod listing;
mod model;

// Re-exports
pub use config::{ModelConfig, ParameterConfig, RandomConfig};
pub use model::{ScenarioModel, ScenarioModelBuilder};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building and querying scenario models
    pub use crate::{ModelConfig, ScenarioModel};
    pub use rsm_core::prelude::*;
    pub use rsm_strategy::prelude::*;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
