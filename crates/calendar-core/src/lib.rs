//! Calendar assistant core - configuration shared by every interface.
//!
//! - **config**: environment-driven settings, validation and secret masking

pub mod config;

pub use config::{
    data_dir_from_env, load_env_file, load_env_file_from, mask_token, Config, ConfigError,
};
