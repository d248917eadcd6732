use std::time::Duration;

use orime_model::{BusLocation, GeoPoint};

/// How the marker should be drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MarkerStyle {
    /// Rotated vehicle icon. The bus is running.
    Directional { angle: f32 },
    /// Plain pin. The bus is parked.
    Pin,
}

struct Glide {
    from: GeoPoint,
    to: GeoPoint,
    elapsed: Duration,
}

/// Turns telemetry samples into a displayed marker position.
///
/// A running bus glides from the previously displayed point to the new one
/// over [`MarkerAnimator::GLIDE_DURATION`]; a parked bus jumps there
/// outright. The very first fix always jumps, there is nothing to glide
/// from.
pub struct MarkerAnimator {
    displayed: Option<GeoPoint>,
    glide: Option<Glide>,
    style: MarkerStyle,
}

impl MarkerAnimator {
    /// Time a glide takes from the old displayed point to the new one.
    pub const GLIDE_DURATION: Duration = Duration::from_millis(1000);

    pub fn new() -> Self {
        Self {
            displayed: None,
            glide: None,
            style: MarkerStyle::Pin,
        }
    }

    /// Consume one telemetry sample.
    pub fn apply(&mut self, sample: &BusLocation) {
        let target = sample.position();

        if sample.ignition {
            self.style = MarkerStyle::Directional {
                angle: sample.angle,
            };

            match self.displayed {
                None => {
                    self.displayed = Some(target);
                    self.glide = None;
                }
                // Glide from wherever the marker is drawn right now, which
                // may be the middle of a previous glide.
                Some(from) if from != target => {
                    self.glide = Some(Glide {
                        from,
                        to: target,
                        elapsed: Duration::ZERO,
                    });
                }
                Some(_) => {}
            }
        } else {
            self.style = MarkerStyle::Pin;
            self.displayed = Some(target);
            self.glide = None;
        }
    }

    /// Step an active glide forward by `elapsed` wall-clock time.
    ///
    /// Returns the point to draw. Once the glide has run its course the
    /// displayed point equals the target and stays there.
    pub fn advance(&mut self, elapsed: Duration) -> Option<GeoPoint> {
        if let Some(glide) = &mut self.glide {
            glide.elapsed += elapsed;

            if glide.elapsed >= Self::GLIDE_DURATION {
                self.displayed = Some(glide.to);
                self.glide = None;
            } else {
                let k = glide.elapsed.as_secs_f64() / Self::GLIDE_DURATION.as_secs_f64();
                self.displayed = Some(GeoPoint {
                    latitude: glide.from.latitude + (glide.to.latitude - glide.from.latitude) * k,
                    longitude: glide.from.longitude
                        + (glide.to.longitude - glide.from.longitude) * k,
                });
            }
        }

        self.displayed
    }

    /// The point currently drawn, if there has been a fix at all.
    pub fn displayed(&self) -> Option<GeoPoint> {
        self.displayed
    }

    pub fn style(&self) -> MarkerStyle {
        self.style
    }

    /// Whether a glide is still underway.
    pub fn in_transition(&self) -> bool {
        self.glide.is_some()
    }
}

impl Default for MarkerAnimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(latitude: f64, longitude: f64, ignition: bool) -> BusLocation {
        BusLocation {
            vehicle_number: "KA-01-F-1234".to_string(),
            latitude,
            longitude,
            location: "somewhere".to_string(),
            speed: if ignition { 25.0 } else { 0.0 },
            ignition,
            angle: 45.0,
            timestamp: 1727848800000,
        }
    }

    #[test]
    fn parked_sample_jumps_immediately() {
        let mut animator = MarkerAnimator::new();

        animator.apply(&sample(12.97, 77.59, false));

        assert_eq!(
            animator.displayed(),
            Some(GeoPoint {
                latitude: 12.97,
                longitude: 77.59
            })
        );
        assert!(!animator.in_transition());
        assert_eq!(animator.style(), MarkerStyle::Pin);
    }

    #[test]
    fn first_fix_jumps_even_when_running() {
        let mut animator = MarkerAnimator::new();

        animator.apply(&sample(12.97, 77.59, true));

        assert_eq!(
            animator.displayed(),
            Some(GeoPoint {
                latitude: 12.97,
                longitude: 77.59
            })
        );
        assert!(!animator.in_transition());
        assert_eq!(animator.style(), MarkerStyle::Directional { angle: 45.0 });
    }

    #[test]
    fn running_sample_glides_instead_of_jumping() {
        let mut animator = MarkerAnimator::new();
        animator.apply(&sample(12.97, 77.59, false));

        animator.apply(&sample(12.98, 77.60, true));

        // Nothing moves until time passes.
        assert!(animator.in_transition());
        assert_eq!(animator.displayed().unwrap().latitude, 12.97);

        // Partway through, the marker is strictly between the two points.
        let midway = animator.advance(Duration::from_millis(400)).unwrap();
        assert!(midway.latitude > 12.97 && midway.latitude < 12.98);
        assert!(midway.longitude > 77.59 && midway.longitude < 77.60);
        assert!(animator.in_transition());

        // After the full duration it lands exactly on the target.
        let landed = animator.advance(Duration::from_millis(700)).unwrap();
        assert_eq!(landed.latitude, 12.98);
        assert_eq!(landed.longitude, 77.60);
        assert!(!animator.in_transition());
    }

    #[test]
    fn retarget_glides_from_the_current_point() {
        let mut animator = MarkerAnimator::new();
        animator.apply(&sample(12.97, 77.59, false));
        animator.apply(&sample(12.98, 77.60, true));

        let midway = animator.advance(Duration::from_millis(500)).unwrap();

        // A fresh sample mid-glide restarts from the drawn position.
        animator.apply(&sample(12.99, 77.61, true));
        assert_eq!(animator.displayed(), Some(midway));

        let landed = animator.advance(MarkerAnimator::GLIDE_DURATION).unwrap();
        assert_eq!(landed.latitude, 12.99);
        assert_eq!(landed.longitude, 77.61);
    }

    #[test]
    fn parked_sample_cancels_a_glide() {
        let mut animator = MarkerAnimator::new();
        animator.apply(&sample(12.97, 77.59, false));
        animator.apply(&sample(12.98, 77.60, true));
        animator.advance(Duration::from_millis(200));

        animator.apply(&sample(12.95, 77.58, false));

        assert!(!animator.in_transition());
        assert_eq!(animator.displayed().unwrap().latitude, 12.95);
        assert_eq!(animator.style(), MarkerStyle::Pin);
    }

    #[test]
    fn repeated_sample_does_not_restart_a_finished_glide() {
        let mut animator = MarkerAnimator::new();
        animator.apply(&sample(12.97, 77.59, true));

        animator.apply(&sample(12.97, 77.59, true));

        assert!(!animator.in_transition());
    }
}
