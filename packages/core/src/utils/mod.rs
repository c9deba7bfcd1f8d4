pub mod buffer;
pub mod validation;
