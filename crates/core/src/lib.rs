//! Card matching and patching engine. Keep this crate free of IO and platform concerns.

pub mod bootstrap;
pub mod classify;
pub mod config;
pub mod distance;
pub mod dom;
pub mod error;
pub mod events;
pub mod icons;
pub mod index;
pub mod manifest;
pub mod normalize;
pub mod patch;
pub mod pipeline;
pub mod resolve;
pub mod watch;

pub use bootstrap::*;
pub use classify::*;
pub use config::*;
pub use distance::*;
pub use dom::*;
pub use error::*;
pub use events::*;
pub use icons::*;
pub use index::*;
pub use manifest::*;
pub use normalize::*;
pub use patch::*;
pub use pipeline::*;
pub use resolve::*;
pub use watch::*;
