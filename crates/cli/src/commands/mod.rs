pub mod config;
pub mod submit;
pub mod test;
