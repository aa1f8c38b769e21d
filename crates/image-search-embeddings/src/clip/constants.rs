//! Constants for the CLIP text encoder.

/// Vocabulary size of the CLIP BPE tokenizer.
pub const CLIP_VOCAB_SIZE: usize = 49408;

/// Maximum tokens for CLIP text encoder, including start and end tokens.
pub const CLIP_MAX_TOKENS: usize = 77;

/// Files expected in a model directory.
pub const CONFIG_FILE: &str = "config.json";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";
