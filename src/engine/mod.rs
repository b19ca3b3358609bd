//! Negotiated-rate resolution engine.
//!
//! - `lock`: channel classes and whether a channel's discount is editable
//! - `overrides`: manually entered rates per slot
//! - `resolve`: per-slot precedence (override, contract, special, discount)
//! - `context`: the reducer that keeps every visible rate consistent
//! - `sheet`: the rate sheet handed on to the plan

mod context;
mod event;
mod lock;
mod overrides;
mod resolve;
mod sheet;

pub use context::{DiscountView, RateContext, RateSettings, SessionSetup, Step, Transition};
pub use event::{EventOutcome, IgnoreReason, RateEvent, ReloadRequest};
pub use lock::{ChannelClass, LockPolicy, LockReason};
pub use overrides::OverrideRegistry;
pub use resolve::{RateRule, RateSource, ResolvedRate, compute, resolve};
pub use sheet::catalog_digest;
