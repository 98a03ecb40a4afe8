//! Resonar Core - fixed-point DSP primitives
//!
//! This crate provides the integer building blocks for the resonar reverb
//! engine, designed for real-time processing with zero allocation in the
//! audio path and no floating-point arithmetic at all.
//!
//! # Core Abstractions
//!
//! ## Fixed-Point Arithmetic
//!
//! - [`mul32x32_shift`] / [`mul32x16_shift`] - widen-then-narrow scaled multiplies
//! - [`sat_add`] / [`sat_sub`] / [`sat_abs`] - saturating combinators (never wrap)
//!
//! ## Function Approximation
//!
//! - [`eval_polynomial`] - Horner-form fixed-point polynomial evaluator
//! - [`exp2_q15`] - base-2 exponential in Q15
//! - [`decay_gain_q15`] - `10^(-3·t/T60)` feedback-gain mapping
//! - [`tan_q26`] - bilinear-transform tangent in Q26
//!
//! ## Filters
//!
//! - [`FirstOrderCoeffs`] - first-order IIR section designed by
//!   [`design_low_pass`] / [`design_high_pass`], running over externally
//!   owned 2-word tap state
//!
//! ## Gain Smoothing
//!
//! Zipper-free gain changes for click-free automation:
//!
//! - [`MixGain`] - single smoothed gain with a one-shot settle callback
//! - [`CrossMixer`] - two independent smoothed gains for tap crossfades
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for embedded audio applications.
//! Disable the default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! resonar-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocation in per-sample or per-block paths
//! - **Integer only**: every signal-path operation is i32/i64 arithmetic
//! - **Saturating**: overflow clamps to the representable range, never wraps

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod approx;
pub mod fixed;
pub mod mixer;
pub mod poly;
pub mod tone;

// Re-export main items at crate root
pub use approx::{decay_gain_q15, exp2_q15, tan_q26};
pub use fixed::{
    GAIN_ONE_Q31, Q15_ONE, Q15_SHIFT, Q31_SHIFT, mul32x16_shift, mul32x32_shift, sat_abs, sat_add,
    sat_sub,
};
pub use mixer::{CrossMixer, MIX_TILE, MixGain};
pub use poly::eval_polynomial;
pub use tone::{
    FirstOrderCoeffs, OMEGA_UNITY_Q26, compute_omega, design_high_pass, design_low_pass,
};
