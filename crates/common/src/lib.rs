//! Lockstep Common Library
//!
//! The shared state that API-side fixture setup and UI-side verification
//! both work against: named [`Collection`]s of [`Value`]s, grouped into a
//! [`MentalModel`] (what the tester expects the application to show) and
//! [`TestData`] (inputs used to build fixtures).

pub mod collection;
pub mod error;
pub mod model;
pub mod test_data;
pub mod value;

// Re-export commonly used types
pub use collection::{Collection, Entries};
pub use error::{Error, Result};
pub use model::MentalModel;
pub use test_data::TestData;
pub use value::Value;

/// Lockstep version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
