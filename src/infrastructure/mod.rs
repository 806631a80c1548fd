//! Infrastructure layer - concrete collaborators (storage, catalog, audio).
//!
//! This layer handles all I/O and implements the domain ports.

pub mod audio_backend;
pub mod catalog;
pub mod config;
pub mod lifecycle;
pub mod listeners;
pub mod local_storage;
pub mod memory_store;

pub use audio_backend::SimulatedAudioSession;
pub use catalog::CatalogTranslator;
pub use config::{
    config_file_path, ensure_config_exists, load_config, load_config_from_file, save_config,
    save_config_to_file,
};
pub use lifecycle::ManualLifecycle;
pub use listeners::ListenerSet;
pub use local_storage::SqliteStateStore;
pub use memory_store::MemoryStateStore;
