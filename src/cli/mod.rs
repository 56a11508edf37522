//! CLI subcommands that run without a live server.
//!
//! ```bash
//! xg-serving config show       # Effective configuration
//! xg-serving config defaults   # Built-in defaults
//! xg-serving config validate   # Exit 1 on warnings
//! ```

pub mod config_cmd;

pub use config_cmd::{run_defaults, run_show, run_validate};
