#[cfg(feature = "huggingface")]
pub mod huggingface;

#[cfg(feature = "ollama")]
pub mod ollama;
