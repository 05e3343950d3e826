pub mod aggregate;
pub mod config;
pub mod detect;
pub mod error;
pub mod events;
pub mod language;
pub mod models;
pub mod policy;
pub mod preferences;
pub mod selection;
