pub mod agent;
pub mod errors;
pub mod models;
pub mod normalizer;
pub mod prompt_template;
pub mod providers;
pub mod tools;
