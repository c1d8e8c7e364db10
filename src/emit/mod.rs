//! Interchange-format emission.

pub mod openscop;

pub use openscop::emit;
