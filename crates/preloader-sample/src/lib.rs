//! # Preloader Sample Library
//!
//! A small library domain (users, books, places) wired onto the preloader. The modules are
//! exposed for integration testing.

pub mod lifecycle;
pub mod model;
pub mod relations;
pub mod repository;
