pub mod cleaner;
pub mod collector;
pub mod env;
pub mod grcov;
