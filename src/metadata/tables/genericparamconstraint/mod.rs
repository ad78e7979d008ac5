//! `GenericParamConstraint` table (0x2c).

mod raw;

pub use raw::*;
