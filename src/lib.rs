//! termgrid - paginated, asynchronously refreshed grids of taxonomy terms.
//!
//! The server renders the first page of a grid into the host page and serves
//! replacement fragments for later pages; the controller drives page changes
//! and keeps session history in step.

pub mod cli;
pub mod config;
pub mod controller;
pub mod grid;
pub mod models;
pub mod repository;
pub mod schema;
pub mod server;
