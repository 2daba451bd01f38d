// All checking functionality is in apastyle-core
// This CLI acts as a thin wrapper around the core library

// Re-export core types for convenience
pub use apastyle_core::*;
