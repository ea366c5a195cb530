//! Configuration system for the notes service.
//!
//! Provides TOML-based configuration with:
//! - `[server]` settings (bind address, port, CORS, request logging)
//! - `[store]` settings (path of the notes file)
//! - Config file layering (user config dir + project-local override)
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1"
//! port = 3000
//!
//! [store]
//! path = "data/notes.json"
//! ```

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_with_options, xdg_config_dir,
    xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
