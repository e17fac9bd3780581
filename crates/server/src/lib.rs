pub mod routes;
pub mod startup;
pub mod errors;
pub mod openapi;
pub mod views;

pub use startup::run;
