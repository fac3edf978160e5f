mod source_writer;

pub use source_writer::SourceWriter;
