//! RSM Core
//!
//! Leaf data types of the robust scenario model.
//!
//! # Overview
//!
//! - **UncertaintyParameters**: validated range, setup and phase statistics
//! - **ScenarioTable**: ordered rows of realized scenarios
//! - **ScenarioIndexSpace**: `{CT × shift × range}` mask with scan-order lookup
//! - **ScenarioError**: error taxonomy shared by every RSM crate
//!
//! # Example
//!
//! ```rust
//! use rsm_core::{IndexDims, ScenarioIndexSpace, Subscript};
//!
//! let dims = IndexDims::new(2, 1, 1);
//! let space = ScenarioIndexSpace::from_realized(
//!     dims,
//!     [Subscript::new(0, 0, 0), Subscript::new(1, 0, 0)],
//! )
//! .unwrap();
//!
//! assert_eq!(space.scenario_number(1).unwrap(), 2);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod index;
pub mod params;
pub mod table;

// Re-exports
pub use error::ScenarioError;
pub use index::{IndexDims, ScenarioIndexSpace, Subscript};
pub use params::{
    parse_phase_rows, CtPhaseProbability, UncertaintyParameters, DEFAULT_RANGE_ABS_SD,
    DEFAULT_RANGE_REL_SD, DEFAULT_SHIFT_SD, DEFAULT_WC_SIGMA,
};
pub use table::{ScenarioEntry, ScenarioTable};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for scenario data types
    pub use crate::{
        CtPhaseProbability, IndexDims, ScenarioEntry, ScenarioError, ScenarioIndexSpace,
        ScenarioTable, Subscript, UncertaintyParameters,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
