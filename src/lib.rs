pub mod api;
pub mod boxes;
pub mod diag;
pub mod known_boxes;
pub mod navigator;
pub mod parser;
pub mod registry;
pub mod stream;
pub mod unknown;
pub mod util;
pub mod walk;

pub use api::{Box, get_boxes};
pub use boxes::{BoxHeader, BoxRef, FourCC, NodeKind};
pub use diag::{Diagnostic, DiagnosticSink, LogSink, MemorySink, NullSink, format_header};
pub use navigator::{bytes_remaining, skip_to_end, skip_to_end_with_trace};
pub use parser::{ParseError, read_header, read_header_within, write_header, write_large_header};
pub use registry::{BoxValue, Registry, default_registry};
pub use stream::{BoxStream, ReadStream, SeekStream};
pub use unknown::{handle_unknown, handle_unknown_traced};
pub use walk::{WalkOptions, Walker};
