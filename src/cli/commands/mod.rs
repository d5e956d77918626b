pub mod invoke;
pub mod token;
