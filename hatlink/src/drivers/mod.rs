//! Driver implementations.
//!
//! Production transports implement the boundary traits out of tree; the
//! simulation driver here provides software-emulated devices for
//! development and testing without physical hardware.

pub mod simulation;
