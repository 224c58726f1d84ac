//! Domain entities

pub mod book;
pub mod user;
