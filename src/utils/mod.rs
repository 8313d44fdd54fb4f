pub mod random;
pub mod validation;
