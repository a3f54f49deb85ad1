use crate::Color;

pub const DEFAULT_EASE_RATE: f64 = 10.0;
pub const DEFAULT_EASE_SNAP: f64 = 1.0 / 255.0;

/// Exponential approach: every step covers `1 / rate` of the remaining
/// distance, and a channel closer than `snap` jumps onto its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Easing {
    rate: f64,
    snap: f64,
}

impl Easing {
    /// `rate` below 1 would overshoot and is clamped to 1 (jump straight to the
    /// target). A non-positive `snap` falls back to the default.
    pub fn new(rate: f64, snap: f64) -> Self {
        Self {
            rate: if rate.is_finite() { rate.max(1.0) } else { DEFAULT_EASE_RATE },
            snap: if snap.is_finite() && snap > 0.0 { snap } else { DEFAULT_EASE_SNAP },
        }
    }

    pub fn step(&self, current: f64, target: f64) -> f64 {
        let delta = target - current;
        if delta.abs() >= self.snap {
            current + delta / self.rate
        } else {
            target
        }
    }

    pub fn step_color(&self, current: Color, target: Color) -> Color {
        let (r, g, b, a) = current.into_components();
        let (tr, tg, tb, ta) = target.into_components();
        Color::new(
            self.step(r, tr),
            self.step(g, tg),
            self.step(b, tb),
            self.step(a, ta),
        )
    }
}

impl Default for Easing {
    fn default() -> Self {
        Self::new(DEFAULT_EASE_RATE, DEFAULT_EASE_SNAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rgba8;

    fn channels(c: Color) -> [f64; 4] {
        let (r, g, b, a) = c.into_components();
        [r, g, b, a]
    }

    #[test]
    fn test_step_is_monotonic_and_converges() {
        let easing = Easing::default();
        let from = rgba8(50, 50, 50, 150);
        let to = rgba8(175, 175, 175, 200);

        let mut current = from;
        let mut ticks = 0;
        while current != to {
            let next = easing.step_color(current, to);
            for ((c, n), t) in channels(current).into_iter().zip(channels(next)).zip(channels(to)) {
                assert!(n >= c, "channel moved away from target");
                assert!(n <= t, "channel overshot target");
            }
            current = next;
            ticks += 1;
            assert!(ticks < 200, "easing did not settle");
        }
    }

    #[test]
    fn test_step_downward_never_overshoots() {
        let easing = Easing::default();
        let mut value = 0.8;
        for _ in 0..100 {
            let next = easing.step(value, 0.2);
            assert!(next <= value && next >= 0.2);
            value = next;
        }
        assert_eq!(value, 0.2);
    }

    #[test]
    fn test_step_at_target_is_stable() {
        let easing = Easing::default();
        let c = rgba8(10, 20, 30, 40);
        assert_eq!(easing.step_color(c, c), c);
    }

    #[test]
    fn test_rate_is_clamped() {
        let easing = Easing::new(0.25, 0.0);
        assert_eq!(easing, Easing::new(1.0, DEFAULT_EASE_SNAP));
        assert_eq!(easing.step(0.0, 1.0), 1.0);
    }
}
