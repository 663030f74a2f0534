//! Connection configuration for the Azkaban client.
//!
//! Implements a kubeconfig-style file with named contexts, each bundling an
//! Azkaban web server endpoint with the credentials used to log into it:
//!
//! ```yaml
//! current-context: prod
//! contexts:
//!   - name: prod
//!     server: https://azkaban.internal:8443
//!     username: etl
//!     password-env: AZKABAN_PASS
//! ```
//!
//! The file lives at `$AZKABAN_CONFIG_DIR/client.yaml`, falling back to the
//! platform config directory (`~/.config/azkaban/client.yaml` on Linux).

pub mod client;
pub mod error;
pub mod paths;

pub use client::{
    client_config_path, ClientConfig, ClientDefaults, Context, ENV_ENDPOINT, ENV_PASSWORD,
    ENV_USERNAME,
};
pub use error::{ConfigError, Result};
pub use paths::config_dir;
