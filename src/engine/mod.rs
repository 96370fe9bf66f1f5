//! engine
//!
//! Drives the command lifecycle: Parse -> Resolve -> Execute -> Render.
//!
//! # Architecture
//!
//! Every input line flows through the same steps:
//!
//! 1. **Parse**: [`command::parse`] turns the line into a typed [`Command`]
//! 2. **Resolve**: the dispatcher looks up every named instance in the
//!    [`Registry`](crate::core::registry::Registry)
//! 3. **Execute**: exactly one container operation runs
//! 4. **Render**: the result becomes a [`Reply`] for stdout, or an
//!    [`ExecError`] for stderr
//!
//! # Invariants
//!
//! - Commands run strictly one at a time; one command owns the registry for
//!   its whole execution
//! - A failed command changes nothing
//! - No error ends the session; only `quit` or end of input does
//!
//! # Example
//!
//! ```
//! use slotwise::core::config::HarnessConfig;
//! use slotwise::engine::{ExecError, Reply, Session};
//! use slotwise::ui::output::Verbosity;
//!
//! let mut session = Session::new(&HarnessConfig::default(), Verbosity::Quiet);
//! session.execute_line("create hashtable hash0").unwrap();
//! session.execute_line("hash_insert hash0 4").unwrap();
//! session.execute_line("hash_apply hash0 square").unwrap();
//! assert_eq!(
//!     session.execute_line("hash_find hash0 16"),
//!     Ok(Reply::Line("16".to_string()))
//! );
//! assert!(matches!(
//!     session.execute_line("hash_find hash0 4"),
//!     Err(ExecError::NotFound { .. })
//! ));
//! ```

pub mod command;
pub mod dispatch;
pub mod session;

pub use command::{Command, ParseError};
pub use dispatch::{dispatch, Reply};
pub use session::{Session, SessionSummary};

use thiserror::Error;

use crate::containers::ContainerError;
use crate::core::registry::{RegistryError, Value};
use crate::core::types::InstanceName;

/// Errors from executing one command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// The line did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A named instance is absent, misnamed or out of range.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A container rejected the operation.
    #[error("{name}: {source}")]
    Container {
        name: InstanceName,
        #[source]
        source: ContainerError,
    },

    /// The operation needs at least one element.
    #[error("{0} is empty")]
    Empty(InstanceName),

    /// A value-keyed lookup missed.
    #[error("{value} not found in {name}")]
    NotFound { name: InstanceName, value: Value },

    /// `list_unique` was given the same list twice.
    #[error("list_unique needs two different lists, got {0} twice")]
    SameList(InstanceName),
}
