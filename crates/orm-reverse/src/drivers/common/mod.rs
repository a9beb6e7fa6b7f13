//! Common utilities shared across database drivers.
//!
//! - [`context`]: naming, warnings and encoding state carried by every parser
//! - [`accumulator`]: name-keyed assembly of indexes and foreign keys from flat rows
//! - [`sqltext`]: statement rewrites shared by the platforms (TOP injection, LOB inlining)
//! - [`worker`]: one blocking catalog connection served from its own thread

pub mod accumulator;
pub mod context;
pub mod sqltext;
pub mod worker;

pub use accumulator::KeyedAccumulator;
pub use context::ParserContext;
pub use sqltext::{inline_lob_params, split_select, top_n, SelectParts};
pub use worker::{Session, WorkerCatalog};
