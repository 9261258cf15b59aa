//! Per-track presentation timestamp remapping.

use crate::{
    curve::SpeedCurve,
    track::{TrackMap, TrackType},
    utils::time::TimeUs,
    Error,
};

// -------------------------------------------------------------------------------------------------

/// Maps raw decoder timestamps of a track onto the corrected output timeline.
///
/// Timestamps must be fed in non-decreasing order per track. Ordering across tracks is not
/// constrained: audio and video each have their own, independent timeline state.
pub trait TimeInterpolator: Send {
    /// Return the corrected timestamp for the given raw track timestamp in microseconds.
    fn interpolate(&mut self, track: TrackType, time_us: TimeUs) -> Result<TimeUs, Error>;

    /// Instantaneous playback speed of the given track at the given raw timestamp.
    /// Used to calculate how many frames a decoded audio chunk should get stretched to.
    fn speed_at(&self, _track: TrackType, _time_us: TimeUs) -> f64 {
        1.0
    }

    /// Forget all track states, so the interpolator can be used for a new job.
    fn reset(&mut self);
}

// -------------------------------------------------------------------------------------------------

/// Mutable timeline state of a single track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackTimeState {
    duration_us: TimeUs,
    last_real_time_us: TimeUs,
    last_corrected_time_us: TimeUs,
    // sub-microsecond part of the corrected time, carried across calls
    corrected_remainder: f64,
}

impl TrackTimeState {
    /// Marks unset timestamps. No valid timestamp ever equals this value.
    pub const UNSET: TimeUs = TimeUs::MIN;

    /// Create a new, uninitialized state for a track with the given total duration.
    pub fn new(duration_us: TimeUs) -> Self {
        Self {
            duration_us,
            last_real_time_us: Self::UNSET,
            last_corrected_time_us: Self::UNSET,
            corrected_remainder: 0.0,
        }
    }

    /// Total original track duration in microseconds.
    pub fn duration_us(&self) -> TimeUs {
        self.duration_us
    }

    /// Last raw timestamp that got interpolated, if any.
    pub fn last_real_time_us(&self) -> Option<TimeUs> {
        (self.last_real_time_us != Self::UNSET).then_some(self.last_real_time_us)
    }

    /// Last corrected timestamp that got returned, if any.
    pub fn last_corrected_time_us(&self) -> Option<TimeUs> {
        (self.last_corrected_time_us != Self::UNSET).then_some(self.last_corrected_time_us)
    }

    pub fn is_initialized(&self) -> bool {
        self.last_real_time_us != Self::UNSET
    }

    /// Normalized track position of the given raw timestamp, clamped to \[0, 1\].
    pub fn position(&self, time_us: TimeUs) -> f64 {
        if self.duration_us <= 0 {
            return 0.0;
        }
        (time_us as f64 / self.duration_us as f64).clamp(0.0, 1.0)
    }

    /// Advance the state to the given raw timestamp, applying the given speed to the elapsed
    /// raw time. The very first timestamp passes through unchanged.
    fn advance(
        &mut self,
        track: TrackType,
        time_us: TimeUs,
        speed: impl FnOnce(f64) -> f64,
    ) -> Result<TimeUs, Error> {
        if !self.is_initialized() {
            self.last_real_time_us = time_us;
            self.last_corrected_time_us = time_us;
            self.corrected_remainder = 0.0;
        } else {
            if time_us < self.last_real_time_us {
                log::warn!(
                    "Rejecting out of order {track} timestamp {time_us}us (last was {}us)",
                    self.last_real_time_us
                );
                return Err(Error::OutOfOrderTimestamp {
                    track,
                    last_time_us: self.last_real_time_us,
                    time_us,
                });
            }
            let real_delta = time_us.saturating_sub(self.last_real_time_us);
            if real_delta > 0 {
                let speed = speed(self.position(time_us));
                debug_assert!(speed > 0.0, "Speed must be > 0");
                let corrected_delta = real_delta as f64 / speed + self.corrected_remainder;
                let whole_delta = corrected_delta.floor();
                self.corrected_remainder = corrected_delta - whole_delta;
                self.last_corrected_time_us =
                    self.last_corrected_time_us.saturating_add(whole_delta as TimeUs);
            }
            self.last_real_time_us = time_us;
        }
        log::debug!(
            "{track} time interpolate: real time: {}us, corrected time: {}us",
            self.last_real_time_us,
            self.last_corrected_time_us
        );
        Ok(self.last_corrected_time_us)
    }

    fn reset(&mut self) {
        *self = Self::new(self.duration_us);
    }
}

// -------------------------------------------------------------------------------------------------

/// Checks that the given track durations are usable for interpolation.
fn validate_durations(durations: &TrackMap<TimeUs>) -> Result<(), Error> {
    for (track, duration) in durations.iter() {
        if *duration <= 0 {
            return Err(Error::ParameterError(format!(
                "Invalid {track} track duration: {duration}us (must be > 0)"
            )));
        }
    }
    Ok(())
}

// -------------------------------------------------------------------------------------------------

/// Time interpolator which leaves timestamps untouched, but still enforces their ordering.
#[derive(Debug, Clone)]
pub struct DefaultTimeInterpolator {
    last_time_us: TrackMap<Option<TimeUs>>,
}

impl Default for DefaultTimeInterpolator {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultTimeInterpolator {
    pub fn new() -> Self {
        Self {
            last_time_us: TrackMap::new(None, None),
        }
    }
}

impl TimeInterpolator for DefaultTimeInterpolator {
    fn interpolate(&mut self, track: TrackType, time_us: TimeUs) -> Result<TimeUs, Error> {
        let last_time_us = self.last_time_us.get_mut(track);
        if let Some(last) = *last_time_us {
            if time_us < last {
                return Err(Error::OutOfOrderTimestamp {
                    track,
                    last_time_us: last,
                    time_us,
                });
            }
        }
        *last_time_us = Some(time_us);
        Ok(time_us)
    }

    fn reset(&mut self) {
        for last_time_us in self.last_time_us.values_mut() {
            *last_time_us = None;
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Time interpolator which applies a constant speed factor to all tracks.
///
/// A factor of 2.0 plays twice as fast, 0.5 plays at half speed. The track durations are not
/// needed here, so any track length, including unknown ones, can be retimed.
#[derive(Debug, Clone)]
pub struct SpeedTimeInterpolator {
    speed: f64,
    states: TrackMap<TrackTimeState>,
}

impl SpeedTimeInterpolator {
    pub fn new(speed: f64) -> Result<Self, Error> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(Error::ParameterError(format!(
                "Invalid speed factor: {speed} (must be > 0)"
            )));
        }
        // durations are only used to evaluate curves, so any value will do
        let states = TrackMap::from_fn(|_| TrackTimeState::new(TimeUs::MAX));
        Ok(Self { speed, states })
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }
}

impl TimeInterpolator for SpeedTimeInterpolator {
    fn interpolate(&mut self, track: TrackType, time_us: TimeUs) -> Result<TimeUs, Error> {
        let speed = self.speed;
        self.states
            .get_mut(track)
            .advance(track, time_us, |_| speed)
    }

    fn speed_at(&self, _track: TrackType, _time_us: TimeUs) -> f64 {
        self.speed
    }

    fn reset(&mut self) {
        for state in self.states.values_mut() {
            state.reset();
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Time interpolator which applies a time-varying [`SpeedCurve`] to all tracks.
///
/// The curve gets evaluated at each track's normalized position `time / duration`, so tracks of
/// different lengths all ramp over their whole duration. Elapsed raw time is divided by the
/// speed at the new timestamp and accumulated into the corrected timeline:
///
/// ```rust
/// use speedramp::{CurveTimeInterpolator, SpeedCurve, TimeInterpolator, TrackMap, TrackType};
///
/// let curve = SpeedCurve::constant(0.5)?;
/// let durations = TrackMap::new(10_000_000, 10_000_000);
/// let mut interpolator = CurveTimeInterpolator::new(curve, durations)?;
///
/// assert_eq!(interpolator.interpolate(TrackType::Audio, 0)?, 0);
/// assert_eq!(interpolator.interpolate(TrackType::Audio, 1_000_000)?, 2_000_000);
/// # Ok::<(), speedramp::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CurveTimeInterpolator {
    curve: SpeedCurve,
    states: TrackMap<TrackTimeState>,
}

impl CurveTimeInterpolator {
    /// Create a new interpolator with the given curve and original track durations.
    pub fn new(curve: SpeedCurve, durations_us: TrackMap<TimeUs>) -> Result<Self, Error> {
        curve.validate()?;
        validate_durations(&durations_us)?;
        let states = durations_us.map(|_, duration| TrackTimeState::new(*duration));
        Ok(Self { curve, states })
    }

    pub fn curve(&self) -> &SpeedCurve {
        &self.curve
    }

    /// Read-only access to a track's timeline state.
    pub fn state(&self, track: TrackType) -> &TrackTimeState {
        self.states.get(track)
    }
}

impl TimeInterpolator for CurveTimeInterpolator {
    fn interpolate(&mut self, track: TrackType, time_us: TimeUs) -> Result<TimeUs, Error> {
        let curve = &self.curve;
        self.states
            .get_mut(track)
            .advance(track, time_us, |position| curve.evaluate(position))
    }

    fn speed_at(&self, track: TrackType, time_us: TimeUs) -> f64 {
        let state = self.states.get(track);
        self.curve.evaluate(state.position(time_us))
    }

    fn reset(&mut self) {
        for state in self.states.values_mut() {
            state.reset();
        }
    }
}

// -------------------------------------------------------------------------------------------------
