//! Loading and generation of manifests, settings and engine configuration.

pub mod load;
pub mod logging;
pub mod schema;
pub mod tools;

pub use load::*;
pub use logging::*;
pub use schema::*;
pub use tools::*;
