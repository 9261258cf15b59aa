#![doc = include_str!("../README.md")]

#[cfg(test)]
macro_rules! assert_eq_with_epsilon {
    ($x:expr, $y:expr, $d:expr) => {
        let (x, y) = ($x, $y);
        assert!((x - y).abs() < $d, "{} != {} (epsilon {})", x, y, $d);
    };
}

// checks that stretchers don't allocate in tests
#[cfg(test)]
#[global_allocator]
static A: assert_no_alloc::AllocDisabler = assert_no_alloc::AllocDisabler;

// private mods (will be partly re-exported)
mod curve;
mod error;
mod interpolator;
mod retimer;
mod stretcher;
mod track;

// public, flat re-exports
pub use error::Error;

pub use curve::{Easing, SpeedCurve};
pub use interpolator::{
    CurveTimeInterpolator, DefaultTimeInterpolator, SpeedTimeInterpolator, TimeInterpolator,
    TrackTimeState,
};
pub use retimer::{AudioRetimer, RetimedChunk};
pub use track::{TrackMap, TrackType};

// public mods
pub mod utils;

pub mod stretchers {
    //! Buffer length reconciliation strategies for interleaved PCM audio.

    pub use super::stretcher::{
        AudioStretcher, CutAudioStretcher, DefaultAudioStretcher, InsertAudioStretcher,
        InsertMode, PassThroughAudioStretcher, Sample, StretchStrategy,
    };
}
