//! # QuizArena Sync Library
//!
//! This library provides the round and session synchronization core for the
//! QuizArena live classroom quiz game. A teacher-side authority publishes a
//! single "current round" signal; this crate keeps each player's view in
//! lockstep with it: adopting rounds, running the countdown, collecting and
//! grading answers, submitting results at most once, and aggregating the
//! per-round and global leaderboards.
//!
//! The crate is deliberately backend- and display-agnostic. Embeddings
//! provide a [`store::ResultStore`] and [`store::ContentStore`] for
//! persistence, a [`render::Surface`] for display, and a single-threaded
//! loop that feeds signal deliveries and clock ticks into the
//! [`sync::Synchronizer`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]

pub mod constants;
pub mod countdown;
pub mod leaderboard;
pub mod quiz;
pub mod render;
pub mod round;
pub mod session;
pub mod store;
pub mod sync;

pub use render::{RenderCommand, Screen, Surface};
pub use round::{RawRound, Round};
pub use store::{ContentStore, MemoryStore, ResultStore, ScoreEvent};
pub use sync::Synchronizer;
