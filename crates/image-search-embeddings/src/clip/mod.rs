//! CLIP text encoder (text tower of openai/clip-vit-*).
//!
//! Produces query vectors in the joint text-image space in which the
//! image corpus was embedded, so text and image vectors compare directly.
//!
//! # Pipeline
//!
//! 1. BPE tokenization with `tokenizer.json` (start/end tokens, max 77)
//! 2. Word + position embeddings
//! 3. Transformer layers with causal attention mask
//! 4. Hidden state at the end token
//! 5. Text projection and L2 normalization

mod attention;
mod config;
mod constants;
mod forward;
mod layer_norm;
mod mlp;
mod model;
mod weights;


pub use config::{Activation, ClipTextConfig};
pub use constants::{CLIP_MAX_TOKENS, CLIP_VOCAB_SIZE, CONFIG_FILE, TOKENIZER_FILE, WEIGHTS_FILE};
pub use model::{select_device, ClipTextModel};
pub use weights::{ClipAttentionWeights, ClipLayerWeights, ClipMlpWeights, ClipTextWeights};
