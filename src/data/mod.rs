pub mod meet;
pub mod synthetic;
pub mod validate;
