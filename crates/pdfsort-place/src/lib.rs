//! pdfsort-place
//!
//! Everything that writes to the output side: relocating files into the
//! `<language>/<topic>` tree, the append-only index, and the outcome logs.

pub mod index;
pub mod logs;
pub mod placement;

pub use index::{read_index, IndexWriter};
pub use logs::{LogKind, RunLogs};
pub use placement::{sanitize_component, Placer};
