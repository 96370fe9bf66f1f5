//! Slotwise - a line-driven harness for intrusive-style containers
//!
//! Slotwise keeps a small registry of named container instances (doubly
//! linked lists, separate-chaining hash tables and fixed-size bitmaps) and
//! mutates them one command line at a time.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line flags and the process entry point
//! - [`engine`] - Line tokenizer, command model, dispatcher and session loop
//! - [`core`] - Instance names, the slot registry and configuration
//! - [`containers`] - Arena-backed list, hash table and bitmap
//! - [`ui`] - Result and diagnostic output
//!
//! # Correctness Invariants
//!
//! 1. A node belongs to at most one list (or bucket) at a time
//! 2. Nodes are released exactly once: on pop, remove, delete or teardown
//! 3. Splice and swap relink nodes; payloads are never copied
//! 4. A failing command leaves every container exactly as it was
//!
//! # Example
//!
//! ```
//! use slotwise::core::config::HarnessConfig;
//! use slotwise::engine::{Reply, Session};
//! use slotwise::ui::output::Verbosity;
//!
//! let mut session = Session::new(&HarnessConfig::default(), Verbosity::Quiet);
//! session.execute_line("create list list0").unwrap();
//! for v in [3, 1, 2] {
//!     session.execute_line(&format!("list_push_back list0 {}", v)).unwrap();
//! }
//! session.execute_line("list_sort list0").unwrap();
//! let reply = session.execute_line("dumpdata list0").unwrap();
//! assert_eq!(reply, Reply::Line("1 2 3".to_string()));
//! ```

pub mod cli;
pub mod containers;
pub mod core;
pub mod engine;
pub mod ui;
