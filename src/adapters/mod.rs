// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod kv_file;
pub mod kv_memory;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::{EngineStatus, FFmpegAdapter};
pub use kv_file::JsonFileKeyValueStore;
pub use kv_memory::InMemoryKeyValueStore;
pub use toml_config::{AppConfig, TomlConfigAdapter};
