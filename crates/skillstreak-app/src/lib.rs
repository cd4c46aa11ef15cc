// Application layer: streak services, queries and wiring
pub mod application;
pub mod bootstrap;
