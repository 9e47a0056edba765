//! Crosswalk Transformer - Convert harvested metadata into canonical records.
//!
//! Library catalog (MARC), archival finding aid (EAD), repository deposit
//! (DSpace METS and DIM), Dublin Core, DataCite and geospatial Aardvark
//! records are all normalized into one canonical [`Record`] schema.
//!
//! # Example
//!
//! ```
//! use crosswalk_transformer::assembler::{Assembled, Assembler};
//! use crosswalk_transformer::config::SourceName;
//! use crosswalk_transformer::reader::Payload;
//!
//! let xml = r#"<record xmlns:dc="http://purl.org/dc/elements/1.1/">
//!   <header><identifier>oai:libguides.com:guides/1</identifier></header>
//!   <metadata>
//!     <dc:title>Chemistry</dc:title>
//!     <dc:identifier>https://libguides.mit.edu/chemistry</dc:identifier>
//!   </metadata>
//! </record>"#;
//!
//! let assembler = Assembler::new(SourceName::Libguides).unwrap();
//! let Assembled::Record(record) = assembler.assemble(&Payload::Xml(xml.into())).unwrap() else {
//!     panic!("expected a record");
//! };
//! assert_eq!(record.timdex_record_id, "libguides:guides-1");
//! assert_eq!(record.title, "Chemistry");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Source table, constants and runtime settings
//! - [`models`]: The canonical record
//! - [`error`]: Error types and Result alias
//! - [`dates`]: Date parsing, validation and normalization
//! - [`xml`]: XML utilities
//! - [`registry`]: Field handler layers and the resolved registry
//! - [`sources`]: Per-format extraction layers
//! - [`assembler`]: Builds and validates one record
//! - [`reader`]: Streaming record readers
//! - [`output`]: Output entries and sinks
//! - [`status`]: Run counters, progress and exception reporting
//! - [`pipeline`]: The runner
//! - [`cli`]: Command-line interface

pub mod assembler;
pub mod cli;
pub mod config;
pub mod dates;
pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod reader;
pub mod registry;
pub mod sources;
pub mod status;
pub mod xml;

// Re-export commonly used items
pub use assembler::{Assembled, Assembler};
pub use config::SourceName;
pub use error::{FieldError, RecordError, Result, TransformError};
pub use models::{Field, Record};
pub use pipeline::{RunInfo, Runner};
