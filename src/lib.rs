// src/lib.rs

//! Negotiated-rate planning library

pub mod engine;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
