//! # CLI Module
//!
//! Command-line interface for the tallyboard server.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Run the web server:
//!
//! ```bash
//! tallyboard serve --addr 0.0.0.0:5001 --store json --data-file data.json
//! ```
//!
//! Options:
//! - `--addr <HOST:PORT>` - Bind address (default: `0.0.0.0:5001`)
//! - `--store <json|memory>` - Count storage backend (default: `json`)
//! - `--data-file <FILE>` - Backing document for the json backend
//! - `--template-dir <DIR>` - Page templates (default: `templates`)
//! - `--static-dir <DIR>` - Static assets (default: `static_site`)
//!
//! The bind address and data file can also come from `TALLY_ADDR` and
//! `TALLY_DATA_FILE`; flags win over environment.
//!
//! ### `standings`
//!
//! Print the current standings from a data file and exit:
//!
//! ```bash
//! tallyboard standings --data-file data.json
//! ```

mod commands;

pub use commands::{run_cli, Cli, Commands, StoreBackend};
