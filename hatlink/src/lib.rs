//! Hatlink Synchronization Core
//!
//! Turns the continuous, high-frequency sample stream delivered by a
//! low-level device driver into discrete, thread-safe application events
//! and blocking operations: motion completion, entered/left distance
//! range, rotated-by-one-degree, and shortest-path positioning.
//!
//! # Module Structure
//!
//! - [`gate`] - Lost-wakeup-free blocking/notification primitive
//! - [`settle`] - Variance-based motion completion detection
//! - [`range`] - Hysteresis edge trigger for the distance stream
//! - [`rotation`] - Rotation-delta filtering for user events
//! - [`angle`] - Shortest-path angle normalization
//! - [`dispatch`] - Per-device sample fan-out over one callback slot
//! - [`task`] - Managed command tasks with join and cancellation
//! - [`motor`] / [`pair`] / [`distance`] - Device-level coordination
//! - [`drivers`] - Simulation driver for development and testing
//!
//! # Usage
//!
//! ```rust,no_run
//! use hatlink::drivers::simulation::SimulatedMotor;
//! use hatlink::Motor;
//! use hatlink_common::config::MotorConfig;
//! use hatlink_common::types::Port;
//! use std::sync::Arc;
//!
//! let motor = Motor::attach(
//!     Arc::new(SimulatedMotor::new()),
//!     Port::A,
//!     MotorConfig::default(),
//! )
//! .unwrap();
//! motor.run_for_degrees(90.0, None).unwrap();
//! ```

pub mod angle;
pub mod dispatch;
pub mod distance;
pub mod drivers;
pub mod gate;
pub mod motor;
pub mod pair;
pub mod range;
pub mod rotation;
pub mod settle;
pub mod task;

pub use distance::DistanceSensor;
pub use gate::BlockingGate;
pub use motor::{MotionPhase, Motor};
pub use pair::MotorPair;
pub use range::RangeEvent;
pub use task::{CancelToken, CommandTask};
