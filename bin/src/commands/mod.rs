//! CLI command implementations.

pub(crate) mod checkpoint;
pub(crate) mod replay;
pub(crate) mod run;
