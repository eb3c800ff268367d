//! qdevice app: process shell around `qdevice-core`.
//!
//! # Module Map
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | JSON device configuration |
//! | [`error`] | `AppError` |
//! | [`logging`] | `tracing-subscriber` installation |
//! | [`fatal`] | Fail-fast handler, the only code that exits the process |
//! | [`session`] | One instance driven through the dispatcher |
//! | [`replay`] | Scripted events fed through a session |

pub mod config;
pub mod error;
pub mod fatal;
pub mod logging;
pub mod replay;
pub mod session;

pub use config::{AlgorithmSelector, DeviceConfig};
pub use error::AppError;
pub use fatal::FailFast;
pub use replay::{Event, Outcome, Record};
pub use session::Session;
