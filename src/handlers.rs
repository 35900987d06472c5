pub mod hello;
pub mod v1;
