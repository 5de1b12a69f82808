//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per render loop, owned by whoever drives the loop
//! - call `start()` once when the loop enters its running state
//! - call `tick()` once per presented frame to obtain `FrameTime`
//!
//! Every operation has an `*_at(Instant)` twin so callers can drive the clock
//! deterministically in tests.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
