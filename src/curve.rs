use crate::Error;

// -------------------------------------------------------------------------------------------------

/// Easing function which shapes a [`SpeedCurve`] over a track's normalized position.
#[derive(Default, Debug, Clone, Copy, PartialEq, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum Easing {
    /// Linear ramp: `y = x`
    Linear,

    /// Cubic Bezier easing with the two control points `(x1, y1)` and `(x2, y2)`. The curve's
    /// end points are fixed at `(0, 0)` and `(1, 1)`, just like CSS `cubic-bezier` timing
    /// functions or path interpolators.
    ///
    /// X coordinates must be within \[0, 1\] so the curve is a function of x. Y coordinates
    /// may overshoot, but the resulting speed gets clamped into the speed range.
    #[strum(disabled)]
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },

    /// Slow start, fast end: `cubic-bezier(0.42, 0, 1, 1)`
    EaseIn,
    /// Fast start, slow end: `cubic-bezier(0, 0, 0.58, 1)`
    EaseOut,
    /// Symmetric S-curve: `cubic-bezier(0.5, 0, 0.5, 1)`
    #[default]
    EaseInOut,
}

impl Easing {
    /// Apply the easing to a normalized position. Positions out of range are clamped.
    pub fn apply(&self, x: f64) -> f64 {
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        match *self {
            Easing::Linear => x,
            Easing::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(x1, y1, x2, y2, x),
            Easing::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, x),
            Easing::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, x),
            Easing::EaseInOut => cubic_bezier(0.5, 0.0, 0.5, 1.0, x),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if let Easing::CubicBezier { x1, y1, x2, y2 } = *self {
            if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
                return Err(Error::ParameterError(
                    "Bezier control points must be finite".to_string(),
                ));
            }
            if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
                return Err(Error::ParameterError(format!(
                    "Bezier x control points must be within [0, 1], got {x1} and {x2}"
                )));
            }
        }
        Ok(())
    }
}

// -------------------------------------------------------------------------------------------------

/// Evaluate a single cubic Bezier coordinate with fixed end points 0 and 1.
#[inline]
fn bezier_coord(p1: f64, p2: f64, t: f64) -> f64 {
    // expanded polynomial of 3(1-t)^2 t p1 + 3(1-t) t^2 p2 + t^3
    let c = 3.0 * p1;
    let b = 3.0 * (p2 - p1) - c;
    let a = 1.0 - c - b;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_coord_derivative(p1: f64, p2: f64, t: f64) -> f64 {
    let c = 3.0 * p1;
    let b = 3.0 * (p2 - p1) - c;
    let a = 1.0 - c - b;
    (3.0 * a * t + 2.0 * b) * t + c
}

/// Solve the Bezier curve's parameter for the given x, then return its y.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    const NEWTON_ITERATIONS: usize = 8;
    const BISECTION_ITERATIONS: usize = 48;
    const EPSILON: f64 = 1e-7;

    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    // Newton-Raphson converges quickly for most curves
    let mut t = x;
    let mut solved = false;
    for _ in 0..NEWTON_ITERATIONS {
        let error = bezier_coord(x1, x2, t) - x;
        if error.abs() < EPSILON {
            solved = true;
            break;
        }
        let slope = bezier_coord_derivative(x1, x2, t);
        if slope.abs() < 1e-6 {
            break;
        }
        t -= error / slope;
        if !(0.0..=1.0).contains(&t) {
            break;
        }
    }

    // fall back to bisection: x(t) is monotonic as long as x1 and x2 are in [0, 1]
    if !solved {
        let (mut low, mut high) = (0.0, 1.0);
        t = x;
        for _ in 0..BISECTION_ITERATIONS {
            let value = bezier_coord(x1, x2, t);
            if (value - x).abs() < EPSILON {
                break;
            }
            if value < x {
                low = t;
            } else {
                high = t;
            }
            t = (low + high) * 0.5;
        }
    }

    bezier_coord(y1, y2, t)
}

// -------------------------------------------------------------------------------------------------

/// Maps a normalized track position to an instantaneous playback speed multiplier.
///
/// The curve is shaped by an [`Easing`] which ramps the speed from `min_speed` at the track's
/// start to `max_speed` at its end. A speed of 0.5 plays the track at half speed (doubling its
/// duration), a speed of 2.0 plays it twice as fast.
///
/// By default the speed ramps smoothly from 0.1x up to 1.0x via an ease-in-out curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedCurve {
    easing: Easing,
    min_speed: f64,
    max_speed: f64,
}

impl Default for SpeedCurve {
    fn default() -> Self {
        Self {
            easing: Easing::default(),
            min_speed: Self::DEFAULT_MIN_SPEED,
            max_speed: Self::DEFAULT_MAX_SPEED,
        }
    }
}

impl SpeedCurve {
    pub const DEFAULT_MIN_SPEED: f64 = 0.1;
    pub const DEFAULT_MAX_SPEED: f64 = 1.0;

    /// Create a new validated speed curve.
    pub fn new(easing: Easing, min_speed: f64, max_speed: f64) -> Result<Self, Error> {
        let curve = Self {
            easing,
            min_speed,
            max_speed,
        };
        curve.validate()?;
        Ok(curve)
    }

    /// Create a curve which evaluates to the given speed everywhere.
    pub fn constant(speed: f64) -> Result<Self, Error> {
        Self::new(Easing::Linear, speed, speed)
    }

    /// Builder function to replace the curve's easing.
    pub fn with_easing(self, easing: Easing) -> Result<Self, Error> {
        Self::new(easing, self.min_speed, self.max_speed)
    }

    /// Builder function to replace the curve's speed range.
    pub fn with_speed_range(self, min_speed: f64, max_speed: f64) -> Result<Self, Error> {
        Self::new(self.easing, min_speed, max_speed)
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn min_speed(&self) -> f64 {
        self.min_speed
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    /// True when the curve evaluates to the same speed at all positions.
    pub fn is_constant(&self) -> bool {
        self.min_speed == self.max_speed
    }

    /// Evaluate the speed at the given normalized position in range \[0, 1\].
    ///
    /// Positions out of range are clamped. The result always lies within the curve's
    /// speed range, so it never is zero.
    pub fn evaluate(&self, position: f64) -> f64 {
        if self.is_constant() {
            return self.min_speed;
        }
        let eased = self.easing.apply(position);
        (self.min_speed + eased * (self.max_speed - self.min_speed))
            .clamp(self.min_speed, self.max_speed)
    }

    /// Check the curve's parameters. Speeds must be finite and `0 < min_speed <= max_speed`.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.min_speed.is_finite() || !self.max_speed.is_finite() {
            return Err(Error::ParameterError(
                "Speed range must be finite".to_string(),
            ));
        }
        if self.min_speed <= 0.0 {
            return Err(Error::ParameterError(format!(
                "Minimum speed must be > 0, got {}",
                self.min_speed
            )));
        }
        if self.min_speed > self.max_speed {
            return Err(Error::ParameterError(format!(
                "Minimum speed {} must not exceed maximum speed {}",
                self.min_speed, self.max_speed
            )));
        }
        self.easing.validate()
    }
}

// -------------------------------------------------------------------------------------------------
