//! Field handler registry.
//!
//! Each source is described by an ordered list of [`Layer`]s, static tables
//! mapping canonical attributes to extraction functions. The layers are
//! folded once into an immutable [`HandlerRegistry`] before any record is
//! processed.

mod core;
mod handler;

pub use core::{HandlerRegistry, Layer};
pub use handler::{DeletedFn, FieldContext, FieldFn, FieldResult, RecordIdFn, SourceRecord};
