//! Domain models for the kit builder.

mod catalog;
mod order;
mod requirements;

pub use catalog::*;
pub use order::*;
pub use requirements::*;
