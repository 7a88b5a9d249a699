//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logging setup
//! - Input events
//! - Storage (LocalStorage on web, files on native)

pub mod input;
pub mod storage;

pub use input::{Action, InputState};
pub use storage::{KeyValueStore, MemoryStore, SharedStore, StorageError, default_store, shared};

/// Route `log` output to the console (web) or stderr (native).
/// Safe to call more than once.
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::debug!("Logger already initialized");
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();
    }
}
