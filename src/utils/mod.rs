pub mod naming;
pub mod staging;
