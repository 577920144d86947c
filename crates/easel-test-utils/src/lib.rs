//! Test utilities for Easel.
//!
//! Canvases start their frame loop through a [`RunnerFactory`]. Tests swap
//! the paced egui runner for a [`MockRunner`], which drives a real headless
//! `egui::Context` as fast as allowed and records what it was asked to do
//! in a shared [`RunnerLog`].
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use easel_egui::{FrameApp, FrameControl, FrameRunner, RunnerParams};
//! use easel_test_utils::{MockRunner, RunnerLog};
//!
//! struct TwoFrames(u32);
//!
//! impl FrameApp for TwoFrames {
//!     fn begin_frame(&mut self) -> FrameControl {
//!         self.0 += 1;
//!         if self.0 > 2 { FrameControl::Exit } else { FrameControl::Continue }
//!     }
//!     fn ui(&mut self, _ctx: &egui::Context) {}
//! }
//!
//! let log = RunnerLog::new();
//! let mut runner = MockRunner::new(log.clone());
//! runner.run(&RunnerParams::default(), &mut TwoFrames(0)).unwrap();
//!
//! assert_eq!(log.frames(), 2);
//! assert!(log.wait_for_frames(2, Duration::from_millis(10)));
//! ```
//!
//! [`RunnerFactory`]: easel_egui::RunnerFactory

pub mod mock_runner;

pub use mock_runner::*;
