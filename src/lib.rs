//! Backend for the hospital indoor navigation app.
//!
//! Stores named locations with 3D coordinates, checks the shared admin
//! PIN and relays icon uploads. [`api::build_router`] exposes all of it
//! over HTTP.

pub mod admin;
pub mod api;
pub mod config;
pub mod database;
pub mod errors;
pub mod locations;
pub mod models;
pub mod uploads;
