pub mod dedupe;
pub mod env_loader;
pub mod excel_writer;
pub mod loader;
pub mod models;
pub mod normalize;
pub mod scoring;
pub mod search;
