// Infrastructure layer: sqlite persistence, event dispatch, settings and logging
// Implements the traits declared in skillstreak-domain

pub mod config;
pub mod events;
pub mod logging;
pub mod notification;
pub mod persistence;
