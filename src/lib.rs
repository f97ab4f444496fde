pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod profile;
pub mod util;
pub mod validate;
