pub mod script;
pub mod witness;
