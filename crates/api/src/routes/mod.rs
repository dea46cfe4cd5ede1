//! Route Handlers

pub mod export;
pub mod weather;
