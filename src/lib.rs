//! Generates canonical IDL documents for services from resolved type metadata.
//!
//! Metadata is built by hand through [`metadata`] or read from a description
//! file with [`SourceResolver`], then rendered by an [`IdlGenerator`].

pub mod ast;
pub mod codegen;
pub mod error;
pub mod generator;
pub mod metadata;
pub mod preprocessing;
pub mod reports;
pub mod resolver;
pub mod syntax;
pub mod types;

pub use error::{Error, TypeError};
pub use generator::{GeneratorConfig, IdlGenerator};
pub use metadata::{MetadataResolver, ResolvedMetadata};
pub use resolver::SourceResolver;
pub use types::WireType;
