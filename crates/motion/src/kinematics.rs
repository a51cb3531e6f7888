//! Leg velocity profiles.
//!
//! A leg runs between two consecutive timetable events. Its profile maps the
//! along-track distance covered since the leg started to the elapsed time,
//! by inverting `x(t) = v0 t + a t^2 / 2` piece by piece.
//!
//! | from → to             | profile                                     |
//! |-----------------------|---------------------------------------------|
//! | Departure → Arrival   | accelerate, cruise, decelerate (symmetric)  |
//! | Departure → Through   | accelerate, then cruise to the end          |
//! | Through → Arrival     | cruise, then decelerate                     |
//! | Through → Through     | constant velocity                           |
//! | same anchor           | hold                                        |

use tracing::warn;

use crate::config::MotionConfig;
use crate::models::types::EventKind;

/// One inter-event span of a coach's journey.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Leg {
    pub from: EventKind,
    pub to: EventKind,
    pub distance_m: f64,
    pub duration_s: f64,
    /// Both events resolve to the same anchor sample.
    pub stationary: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LegProfile {
    Hold {
        duration_s: f64,
    },
    Trapezoid {
        distance_m: f64,
        duration_s: f64,
        ratio: f64,
    },
    AccelerateCruise {
        distance_m: f64,
        duration_s: f64,
        ratio: f64,
    },
    CruiseDecelerate {
        distance_m: f64,
        duration_s: f64,
        ratio: f64,
    },
    Constant {
        distance_m: f64,
        duration_s: f64,
    },
}

impl LegProfile {
    /// Profile for `leg`, or `None` for kind pairs that describe no motion
    /// the engine models (e.g. arriving twice in a row at different places).
    pub fn select(leg: &Leg, config: &MotionConfig) -> Option<Self> {
        let (distance_m, duration_s) = (leg.distance_m, leg.duration_s);
        if leg.stationary {
            return Some(Self::Hold { duration_s });
        }

        match (leg.from, leg.to) {
            (EventKind::Departure, EventKind::Arrival) => Some(Self::Trapezoid {
                distance_m,
                duration_s,
                ratio: config.departure_ratio,
            }),
            (EventKind::Departure, EventKind::Through) => Some(Self::AccelerateCruise {
                distance_m,
                duration_s,
                ratio: config.through_ratio,
            }),
            (EventKind::Through, EventKind::Arrival) => Some(Self::CruiseDecelerate {
                distance_m,
                duration_s,
                ratio: config.through_ratio,
            }),
            (EventKind::Through, EventKind::Through) => Some(Self::Constant {
                distance_m,
                duration_s,
            }),
            (from, to) => {
                warn!(?from, ?to, "No velocity profile for event pair, skipping leg");
                None
            }
        }
    }

    pub fn duration_s(&self) -> f64 {
        match *self {
            Self::Hold { duration_s }
            | Self::Trapezoid { duration_s, .. }
            | Self::AccelerateCruise { duration_s, .. }
            | Self::CruiseDecelerate { duration_s, .. }
            | Self::Constant { duration_s, .. } => duration_s,
        }
    }

    pub fn distance_m(&self) -> f64 {
        match *self {
            Self::Hold { .. } => 0.0,
            Self::Trapezoid { distance_m, .. }
            | Self::AccelerateCruise { distance_m, .. }
            | Self::CruiseDecelerate { distance_m, .. }
            | Self::Constant { distance_m, .. } => distance_m,
        }
    }

    /// Seconds since the leg started at which the train has covered `x` meters.
    pub fn elapsed(&self, x: f64) -> f64 {
        let (d, t) = (self.distance_m(), self.duration_s());
        if matches!(self, Self::Hold { .. }) || x >= d {
            return t;
        }
        if x <= 0.0 {
            return 0.0;
        }

        match *self {
            Self::Hold { .. } => t,
            Self::Trapezoid { ratio: r, .. } => {
                let vel = d / ((1.0 - r) * t);
                let x0 = r * d / (2.0 * (1.0 - r));
                let x1 = (2.0 - 3.0 * r) * d / (2.0 * (1.0 - r));
                if x < x0 {
                    phase_time(x, r * t, x0, 0.0)
                } else if x <= x1 {
                    phase_time(x - x0, (1.0 - 2.0 * r) * t, x1 - x0, vel) + r * t
                } else {
                    phase_time(x - x1, r * t, x0, vel) + (1.0 - r) * t
                }
            }
            Self::AccelerateCruise { ratio: r, .. } => {
                let vel = 2.0 * d / ((2.0 - r) * t);
                let x0 = r * d / (2.0 - r);
                if x < x0 {
                    phase_time(x, r * t, x0, 0.0)
                } else {
                    phase_time(x - x0, (1.0 - r) * t, d - x0, vel) + r * t
                }
            }
            Self::CruiseDecelerate { ratio: r, .. } => {
                let vel = 2.0 * d / ((2.0 - r) * t);
                let x0 = 2.0 * (1.0 - r) * d / (2.0 - r);
                if x < x0 {
                    phase_time(x, (1.0 - r) * t, x0, vel)
                } else {
                    phase_time(x - x0, r * t, d - x0, vel) + (1.0 - r) * t
                }
            }
            Self::Constant { .. } => phase_time(x, t, d, d / t),
        }
    }
}

/// Time to cover `x` meters of a phase that covers `d` meters in `t` seconds
/// starting at speed `v`, under constant acceleration.
///
/// Phases shorter than a second are ill-conditioned and yield 0.
pub fn phase_time(x: f64, t: f64, d: f64, v: f64) -> f64 {
    if t.is_nan() || t < 1.0 {
        warn!(x, t, d, v, "Phase duration under one second");
        return 0.0;
    }

    let alpha = 2.0 * (d - v * t) / (t * t);
    if alpha.abs() < 0.001 && v != 0.0 {
        return x / v;
    }
    if alpha == 0.0 {
        return 0.0;
    }

    let discriminant = (v * v + 2.0 * alpha * x).max(0.0);
    ((-v + discriminant.sqrt()) / alpha).max(0.0)
}
