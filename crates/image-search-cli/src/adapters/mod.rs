//! Adapters bridging concrete backends to the core traits.

mod clip_encoder;

pub use clip_encoder::{map_embedding_error, ClipEncoderAdapter};
