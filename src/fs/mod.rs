pub mod copy;
pub mod tree;
pub mod types;

pub use copy::{copy_file_chunked, CHUNK_SIZE};
pub use tree::TreeWalker;
pub use types::*;
