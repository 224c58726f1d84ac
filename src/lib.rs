//! Lectern Library Management System
//!
//! An in-memory library registry (catalog, patrons, lending rules) with
//! whole-state persistence to a relational store.

pub mod config;
pub mod console;
pub mod error;
pub mod models;
pub mod registry;
pub mod repository;
pub mod search;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use registry::Registry;
