//! Common types for loan data shared across crates.

mod columns;
mod decision;
mod label;
mod step;

pub use columns::*;
pub use decision::*;
pub use label::*;
pub use step::*;
