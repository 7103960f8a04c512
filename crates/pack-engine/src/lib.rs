mod normalize;
pub mod packer;
mod options;
mod stats;
mod types;
mod verify;

pub use normalize::{normalize, normalize_with_options};
pub use options::*;
pub use packer::{CancelToken, NoProgress, ProgressSink, pack, pack_async, pack_with_progress};
pub use stats::calculate_statistics;
pub use types::*;
pub use verify::verify_layout;
