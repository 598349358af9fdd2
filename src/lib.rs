//! A self-hostable store for short tagged notes ("entries") grouped into
//! journals, with tag-ranked search.
//!
//! Open a pool with [`db::connect`], run [`schema::ensure_current`] once, then
//! use the functions in [`store`] and [`search`].

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod schema;
pub mod search;
pub mod store;
pub mod tools;

pub use config::{Config, Durability, Location};
pub use error::{AppError, Result};
