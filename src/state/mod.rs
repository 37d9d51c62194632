//! State Module - Runtime input state
//!
//! - **Mouse** - Hit testing, press/release tracking, click dispatch

mod mouse;

pub use mouse::*;
