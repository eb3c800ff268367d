//! Fixed values shared by the registry, dispatcher and the app crate.

/// Number of decision algorithms compiled into the device.
///
/// Valid [`AlgorithmId`](crate::types::AlgorithmId) values form the
/// contiguous range `0..SUPPORTED_ALGORITHMS`.
pub const SUPPORTED_ALGORITHMS: usize = 4;

/// Process exit status used when an instance selects an algorithm that
/// has no registered descriptor.
pub const EXIT_INVALID_SELECTION: i32 = 1;

/// Process exit status used when built-in registration fails at startup.
pub const EXIT_STARTUP_FAILURE: i32 = 1;

/// Configuration names of the built-in algorithms, indexed by id.
pub const ALGORITHM_NAMES: [&str; SUPPORTED_ALGORITHMS] = ["test", "ffsplit", "2nodelms", "lms"];

/// Largest configuration node list the two-node policy accepts.
pub const TWO_NODE_LIST_LIMIT: usize = 2;
