pub mod append_signature;
pub mod initialize;

pub use append_signature::*;
pub use initialize::*;
