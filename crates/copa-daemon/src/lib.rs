mod dto;
mod routes;
pub mod server;
pub mod telemetry;
