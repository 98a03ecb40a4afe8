//! Resonar Reverb - fixed-point multi-delay-line reverberation
//!
//! This crate implements a real-time reverb engine on the resonar-core
//! integer primitives: one to four crossfaded all-pass delay lines, a
//! rotation-matrix stereo stage, and smoothed parameter application,
//! all in saturating i32 arithmetic over caller-owned memory.
//!
//! - [`ReverbEngine`] - the engine itself, bound to caller regions
//! - [`ControlParams`] / [`InstanceParams`] - the control surface
//! - [`MemoryLayout`] / [`MemoryRegions`] - the two-pass arena plan
//! - [`ReverbError`] - boundary-validation error taxonomy
//!
//! ## Example
//!
//! ```rust,ignore
//! use resonar_reverb::{
//!     ControlParams, DelayLines, InstanceParams, MemoryLayout, MemoryRegions,
//!     RegionKind, ReverbEngine,
//! };
//!
//! let instance = InstanceParams { max_block_size: 256, num_delay_lines: DelayLines::Four };
//! let layout = MemoryLayout::plan(&instance)?;
//! // ... allocate one i32 buffer per region from layout.words(..) ...
//! let mut engine = ReverbEngine::create(instance, regions)?;
//!
//! let mut params = ControlParams::default();
//! params.level = 60;
//! engine.set_control_parameters(&params)?;
//! engine.process(&input, &mut output, 256)?;
//! ```
//!
//! The host owns all storage; the engine performs no allocation or
//! locking on the audio path and is `no_std` compatible with the
//! default `std` feature disabled.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod engine;
pub mod error;
pub mod layout;
pub mod params;
pub mod tables;

mod line;

// Re-export main types at crate root
pub use engine::ReverbEngine;
pub use error::ReverbError;
pub use layout::{MemoryLayout, MemoryRegions, RegionKind};
pub use params::{
    ControlParams, DelayLines, InstanceParams, OperatingMode, SampleRate, SourceFormat,
};
