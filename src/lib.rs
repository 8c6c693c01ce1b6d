pub mod configuration;
pub mod domain;
pub mod entities;
pub mod recorder;
pub mod routes;
pub mod startup;
pub mod store;
pub mod telemetry;
