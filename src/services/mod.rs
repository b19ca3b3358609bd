//! Service layer for the rate planner.
//!
//! This module contains the parts that talk to the outside world:
//! - Catalog providers (`HttpCatalog`, `FileCatalog`)
//! - The async session driver (`RateSession`)

mod catalog;
mod session;

pub use catalog::{
    CatalogProvider, FileCatalog, HttpCatalog, fetch_many, load_or_empty, parse_catalog,
};
pub use session::RateSession;
