// src/models/mod.rs

//! Domain models for the rate planner.
//!
//! This module contains the data structures shared by the engine, the
//! catalog services and the CLI, organized by their primary purpose.

mod config;
mod program;
mod selection;
mod sheet;

// Re-export all public types
pub use config::{
    CatalogConfig, ChannelConfig, ClientConfig, Config, ContractedChannel, RateConfig,
    TargetGroup,
};
pub use program::{CatalogRecord, CatalogResponse, ProgramSlot, SlotId};
pub use selection::Selection;
pub use sheet::{RateRow, RateSheet};
