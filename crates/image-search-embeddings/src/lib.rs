//! Text embedding for image search.
//!
//! Maps query text into the CLIP joint text-image space so that text
//! vectors are directly comparable with stored image vectors.
//!
//! # Architecture
//!
//! - **ClipTextModel**: owned, immutable handle to the CLIP text tower
//!   (tokenizer + weights + device), built once with [`ClipTextModel::load`]
//! - **ClipTextConfig**: model hyperparameters, read from `config.json`
//! - **select_device**: CPU, or CUDA device 0 when requested and available
//!
//! # Example
//!
//! ```rust,ignore
//! use std::path::Path;
//! use image_search_embeddings::{select_device, ClipTextModel};
//!
//! let device = select_device(false);
//! let model = ClipTextModel::load(Path::new("models/clip-vit-base-patch32"), &device)?;
//! let vector = model.encode("a red car parked by the sea")?;
//! assert_eq!(vector.len(), model.dimension());
//! ```

pub mod clip;
pub mod error;
pub mod ops;

pub use clip::{select_device, Activation, ClipTextConfig, ClipTextModel, ClipTextWeights};
pub use error::{EmbeddingError, EmbeddingResult};
