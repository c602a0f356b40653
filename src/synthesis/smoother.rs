use crate::{foundation::core::Position3D, synthesis::config::SmoothingConfig};

/// Exponential low-pass filter over raw viewpoint samples.
///
/// Per axis: `smoothed = (1 - α) * previous + α * raw`, with one coefficient for x/y and
/// another for z. The first sample after construction or [`reset`](Self::reset) is taken as is.
/// Until then [`current`](Self::current) reports the rest position.
#[derive(Clone, Debug)]
pub struct ViewpointSmoother {
    config: SmoothingConfig,
    rest: Position3D,
    previous: Option<Position3D>,
}

impl ViewpointSmoother {
    pub fn new(config: SmoothingConfig, rest: Position3D) -> Self {
        Self {
            config,
            rest,
            previous: None,
        }
    }

    pub fn config(&self) -> SmoothingConfig {
        self.config
    }

    /// Feed one raw sample and return the new smoothed position.
    ///
    /// Non-finite samples are dropped and leave the state untouched.
    pub fn observe(&mut self, raw: Position3D) -> Position3D {
        if !raw.is_finite() {
            tracing::trace!(?raw, "dropping non-finite viewpoint sample");
            return self.current();
        }
        let next = match self.previous {
            None => raw,
            Some(prev) => Position3D {
                x: blend(prev.x, raw.x, self.config.alpha_lateral),
                y: blend(prev.y, raw.y, self.config.alpha_lateral),
                z: blend(prev.z, raw.z, self.config.alpha_depth),
            },
        };
        self.previous = Some(next);
        next
    }

    /// Last smoothed position, or the rest position before the first sample.
    pub fn current(&self) -> Position3D {
        self.previous.unwrap_or(self.rest)
    }

    pub fn rest(&self) -> Position3D {
        self.rest
    }

    pub fn is_tracking(&self) -> bool {
        self.previous.is_some()
    }

    /// Forget the filter state; the next sample seeds it again.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn set_rest(&mut self, rest: Position3D) {
        self.rest = rest;
    }
}

fn blend(previous: f64, raw: f64, alpha: f64) -> f64 {
    (1.0 - alpha) * previous + alpha * raw
}

#[cfg(test)]
#[path = "../../tests/unit/synthesis/smoother.rs"]
mod tests;
