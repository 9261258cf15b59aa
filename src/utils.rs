//! Buffer and time helpers, shared by the interpolators, stretchers and the audio retimer.

pub mod buffer;
pub mod time;
