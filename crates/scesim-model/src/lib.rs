//! scesim Model
//!
//! In-memory representation of a scenario-simulation document.
//!
//! # Structure
//!
//! ```text
//! ScenarioSimulationModel (version)
//! ├── Imports
//! └── Simulation
//!     ├── SimulationDescriptor (type, dmoSession | dmnFilePath)
//!     │   └── FactMapping*  (column definitions)
//!     └── Scenario*         (one test case each)
//!         └── FactMappingValue* (cells)
//! ```
//!
//! All types derive serde traits with the tag and attribute names of the
//! persisted XML format; the persistence crate drives the actual encoding.
//!
//! # Example
//!
//! ```rust
//! use scesim_model::{ScenarioSimulationModel, SimulationType};
//!
//! let mut model = ScenarioSimulationModel::new();
//! model.simulation_mut().descriptor_mut().set_type(SimulationType::Rule);
//!
//! let index = model.simulation_mut().add_scenario();
//! model
//!     .simulation_mut()
//!     .scenario_by_index_mut(index)
//!     .unwrap()
//!     .set_description("Adult applicant");
//!
//! assert_eq!(model.simulation().scenario_map().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod descriptor;
pub mod error;
pub mod fact_mapping;
pub mod imports;
pub mod model;
pub mod simulation;

pub use descriptor::{SimulationDescriptor, SimulationType};
pub use error::ModelError;
pub use fact_mapping::{
    ExpressionElement, ExpressionIdentifier, FactIdentifier, FactMapping, FactMappingType,
    FactMappingValue,
};
pub use imports::{Import, Imports};
pub use model::{ScenarioSimulationModel, CURRENT_VERSION};
pub use simulation::{Scenario, ScenarioMap, Simulation};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with scenario-simulation documents
    pub use crate::{
        ExpressionIdentifier, FactIdentifier, FactMapping, FactMappingType, Scenario,
        ScenarioMap, ScenarioSimulationModel, Simulation, SimulationDescriptor, SimulationType,
    };
}
