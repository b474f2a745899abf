//! Library crate for squares-back, exposing modules for binaries and integration tests.

pub mod dao;
mod dto;
mod error;
pub mod feed;
pub mod routes;
pub mod services;
pub mod state;
