//! scesim Persistence
//!
//! Reads, writes and upgrades `.scesim` documents.
//!
//! # Core Operations
//!
//! - **Marshal**: `ScenarioSimulationModel` → XML at the current version
//! - **Unmarshal**: XML → `ScenarioSimulationModel`, migrating first
//! - **Migrate**: older XML → current XML, one schema version at a time
//!
//! # Architecture
//!
//! ```text
//! raw XML ──extract_version──► 1.0 ─► 1.1 ─► 1.2 ─► 1.3 ──quick-xml serde──► model
//!                               (MIGRATIONS table, event-stream rewrites)
//! ```
//!
//! # Example
//!
//! ```rust
//! use scesim_model::ScenarioSimulationModel;
//! use scesim_persistence::XmlPersistence;
//!
//! let persistence = XmlPersistence::instance();
//! let xml = persistence.marshal(&ScenarioSimulationModel::new()).unwrap();
//! assert!(xml.starts_with("<ScenarioSimulationModel version=\"1.3\">"));
//!
//! let model = persistence.unmarshal(&xml).unwrap();
//! assert_eq!(model.version(), XmlPersistence::current_version());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod migration;
pub mod persistence;
pub mod validation;

pub use error::{PersistenceError, PersistenceResult};
pub use migration::{MigrationStep, MIGRATIONS};
pub use persistence::XmlPersistence;
pub use validation::{validate, ValidationIssue};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
