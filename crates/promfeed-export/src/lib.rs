pub mod error;
pub mod partition;
pub mod render;
pub mod writer;

pub use error::ExportError;
pub use partition::{partition, PartitionPolicy};
pub use render::{render_chunk, RenderedChunk};
pub use writer::{artifact_names, write_gzip_atomic, OutputPlan};
