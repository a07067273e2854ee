pub mod base;
pub mod configs;
pub mod ollama;
pub mod utils;

#[cfg(test)]
pub mod mock;
