//! Active and passive sonar.
//!
//! Sonar is the only way a captain learns about other boats, and the three
//! channels disclose different things:
//!
//! | Channel | Trigger | Reveals | Target told? |
//! |---|---|---|---|
//! | Active ping ([`active_ping`]) | explicit ping | exact range/bearing/depth | yes, pinger name + rough range |
//! | Active visibility ([`active_contacts`]) | either side pinged within the window | exact position | no |
//! | Passive ([`passive_contacts`]) | always on | noisy range/bearing | no |
//!
//! Ranges are straight-line 3-D distances including depth. Dead boats neither
//! hear nor are heard.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::config::Tuning;
use crate::entity::{PlayerId, Submarine};
use crate::physics::{bearing, distance_3d, normalize_heading};

/// Exact contact returned to a pinging captain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveContact {
    /// Contact's player id
    pub id: PlayerId,
    /// Contact's display name
    pub username: String,
    /// Range, rounded to 0.1
    pub distance: f64,
    /// Bearing from the pinger, rounded to 0.1
    pub bearing: f64,
    /// Contact depth, rounded to 0.1
    pub depth: f64,
}

/// Notice to a boat that it was pinged.
///
/// Names the pinger and gives a rough range but no position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingDetection {
    /// Boat that heard the ping
    pub target_id: PlayerId,
    /// Boat that pinged
    pub pinger_id: PlayerId,
    /// Pinger's display name
    pub pinger_name: String,
    /// Approximate range, rounded to 0.1
    pub distance: f64,
}

/// Everything an active ping produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PingResult {
    /// Contacts for the pinger
    pub contacts: Vec<ActiveContact>,
    /// One notice per boat in range, each addressed to that boat only
    pub detections: Vec<PingDetection>,
}

/// A boat lit up on active sonar in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SonarContact {
    /// Contact's player id
    pub id: PlayerId,
    /// Contact's display name
    pub username: String,
    /// Exact x
    pub x: f64,
    /// Exact y
    pub y: f64,
    /// Exact depth
    pub depth: f64,
    /// Exact range from the viewer
    pub distance: f64,
    /// Exact bearing from the viewer
    pub bearing: f64,
}

/// A boat heard on passive sonar. Range and bearing carry noise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassiveContact {
    /// Contact's player id
    pub id: PlayerId,
    /// Contact's display name
    pub username: String,
    /// Noisy range
    pub distance: f64,
    /// Noisy bearing in `[0, 360)`
    pub bearing: f64,
    /// Contact depth
    pub depth: f64,
}

/// Rounds to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Geometry of one boat as seen from another.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Observation {
    distance: f64,
    bearing: f64,
}

fn observe(observer: &Submarine, target: &Submarine) -> Observation {
    let offset: DVec2 = target.position() - observer.position();
    Observation {
        distance: distance_3d(
            observer.position(),
            observer.depth(),
            target.position(),
            target.depth(),
        ),
        bearing: bearing(offset),
    }
}

/// Other live boats, skipping the observer itself.
fn others<'a>(
    observer: &'a Submarine,
    fleet: impl IntoIterator<Item = &'a Submarine> + 'a,
) -> impl Iterator<Item = &'a Submarine> + 'a {
    fleet
        .into_iter()
        .filter(move |other| other.id() != observer.id() && other.is_alive())
}

/// Resolves an active ping from `pinger` against `fleet`.
///
/// Does not record the ping time; the engine does that.
#[must_use]
pub fn active_ping<'a>(
    pinger: &'a Submarine,
    fleet: impl IntoIterator<Item = &'a Submarine> + 'a,
    tuning: &Tuning,
) -> PingResult {
    let mut result = PingResult::default();
    if !pinger.is_alive() {
        return result;
    }
    for other in others(pinger, fleet) {
        let seen = observe(pinger, other);
        if seen.distance > tuning.sonar_range {
            continue;
        }
        result.contacts.push(ActiveContact {
            id: other.id().clone(),
            username: other.name().to_owned(),
            distance: round1(seen.distance),
            bearing: round1(seen.bearing),
            depth: round1(other.depth()),
        });
        result.detections.push(PingDetection {
            target_id: other.id().clone(),
            pinger_id: pinger.id().clone(),
            pinger_name: pinger.name().to_owned(),
            distance: round1(seen.distance),
        });
    }
    result
}

/// Boats within active range where either side pinged inside the window.
#[must_use]
pub fn active_contacts<'a>(
    viewer: &'a Submarine,
    fleet: impl IntoIterator<Item = &'a Submarine> + 'a,
    now: Timestamp,
    tuning: &Tuning,
) -> Vec<SonarContact> {
    if !viewer.is_alive() {
        return Vec::new();
    }
    let window = tuning.ping_visibility_window;
    let viewer_pinged = viewer.pinged_within(now, window);
    others(viewer, fleet)
        .filter_map(|other| {
            let seen = observe(viewer, other);
            let lit = viewer_pinged || other.pinged_within(now, window);
            (seen.distance <= tuning.sonar_range && lit).then(|| SonarContact {
                id: other.id().clone(),
                username: other.name().to_owned(),
                x: other.position().x,
                y: other.position().y,
                depth: other.depth(),
                distance: seen.distance,
                bearing: seen.bearing,
            })
        })
        .collect()
}

/// Perturbs a true reading with the passive noise model.
///
/// Bearing moves by a uniform draw from `[-B, +B]` degrees, distance is scaled
/// by a uniform draw from `[1 - D, 1 + D]`. Draws are independent per call.
pub fn apply_passive_noise<R: Rng + ?Sized>(
    distance: f64,
    true_bearing: f64,
    tuning: &Tuning,
    rng: &mut R,
) -> (f64, f64) {
    let b = tuning.passive_noise_bearing;
    let d = tuning.passive_noise_distance;
    let bearing_noise = rng.gen_range(-b..=b);
    let distance_factor = rng.gen_range((1.0 - d)..=(1.0 + d));
    (
        distance * distance_factor,
        normalize_heading(true_bearing + bearing_noise),
    )
}

/// Every live boat within passive range, with fresh noise on each reading.
pub fn passive_contacts<'a, R: Rng + ?Sized>(
    viewer: &'a Submarine,
    fleet: impl IntoIterator<Item = &'a Submarine> + 'a,
    tuning: &Tuning,
    rng: &mut R,
) -> Vec<PassiveContact> {
    if !viewer.is_alive() {
        return Vec::new();
    }
    let mut contacts = Vec::new();
    for other in others(viewer, fleet) {
        let seen = observe(viewer, other);
        if seen.distance > tuning.passive_sonar_range {
            continue;
        }
        let (distance, bearing) = apply_passive_noise(seen.distance, seen.bearing, tuning, rng);
        contacts.push(PassiveContact {
            id: other.id().clone(),
            username: other.name().to_owned(),
            distance,
            bearing,
            depth: other.depth(),
        });
    }
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::angular_difference;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn boat(id: &str, x: f64, y: f64, depth: f64) -> Submarine {
        let t = Tuning::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut sub = Submarine::spawn(PlayerId::from(id), id.to_uppercase(), &t, &mut rng);
        sub.place(DVec2::new(x, y), depth, 0.0, &t);
        sub
    }

    fn dead(mut sub: Submarine) -> Submarine {
        sub.take_hit(Timestamp::ZERO, &Tuning::default());
        sub
    }

    #[test]
    fn round1_rounds_half_away() {
        assert_eq!(round1(100.04), 100.0);
        assert_eq!(round1(100.06), 100.1);
        assert_eq!(round1(-2.25), -2.3);
    }

    mod active_ping_tests {
        use super::*;

        #[test]
        fn reports_exact_contact_and_detection() {
            let t = Tuning::default();
            let a = boat("a", 0.0, 0.0, 50.0);
            let b = boat("b", 100.0, 0.0, 50.0);
            let result = active_ping(&a, [&a, &b], &t);

            assert_eq!(result.contacts.len(), 1);
            let c = &result.contacts[0];
            assert_eq!(c.id, PlayerId::from("b"));
            assert_eq!(c.distance, 100.0);
            assert_eq!(c.bearing, 90.0);
            assert_eq!(c.depth, 50.0);

            assert_eq!(result.detections.len(), 1);
            let d = &result.detections[0];
            assert_eq!(d.target_id, PlayerId::from("b"));
            assert_eq!(d.pinger_id, PlayerId::from("a"));
            assert_eq!(d.pinger_name, "A");
            assert_eq!(d.distance, 100.0);
        }

        #[test]
        fn range_includes_depth() {
            let t = Tuning::default();
            let a = boat("a", 0.0, 0.0, 0.0);
            // 400 horizontal, 300 vertical: exactly 500
            let b = boat("b", 400.0, 0.0, 300.0);
            assert_eq!(active_ping(&a, [&b], &t).contacts.len(), 1);
            let c = boat("c", 401.0, 0.0, 300.0);
            assert!(active_ping(&a, [&c], &t).contacts.is_empty());
        }

        #[test]
        fn skips_dead_and_self() {
            let t = Tuning::default();
            let a = boat("a", 0.0, 0.0, 50.0);
            let b = dead(boat("b", 10.0, 0.0, 50.0));
            let result = active_ping(&a, [&a, &b], &t);
            assert!(result.contacts.is_empty());
            assert!(result.detections.is_empty());
        }

        #[test]
        fn dead_pinger_gets_nothing() {
            let t = Tuning::default();
            let a = dead(boat("a", 0.0, 0.0, 50.0));
            let b = boat("b", 10.0, 0.0, 50.0);
            assert_eq!(active_ping(&a, [&b], &t), PingResult::default());
        }
    }

    mod active_visibility_tests {
        use super::*;

        #[test]
        fn nobody_pinged_means_no_contacts() {
            let t = Tuning::default();
            let a = boat("a", 0.0, 0.0, 50.0);
            let b = boat("b", 100.0, 0.0, 50.0);
            assert!(active_contacts(&a, [&b], Timestamp::from_secs(100.0), &t).is_empty());
        }

        #[test]
        fn either_side_pinging_lights_both() {
            let t = Tuning::default();
            let mut a = boat("a", 0.0, 0.0, 50.0);
            let b = boat("b", 100.0, 0.0, 50.0);
            a.record_ping(Timestamp::from_secs(10.0));
            let now = Timestamp::from_secs(12.0);

            let from_a = active_contacts(&a, [&b], now, &t);
            assert_eq!(from_a.len(), 1);
            assert_eq!(from_a[0].x, 100.0);
            assert_eq!(from_a[0].y, 0.0);

            let from_b = active_contacts(&b, [&a], now, &t);
            assert_eq!(from_b.len(), 1);
            assert_eq!(from_b[0].id, PlayerId::from("a"));
        }

        #[test]
        fn window_closes() {
            let t = Tuning::default();
            let mut a = boat("a", 0.0, 0.0, 50.0);
            let b = boat("b", 100.0, 0.0, 50.0);
            a.record_ping(Timestamp::from_secs(10.0));
            assert_eq!(active_contacts(&b, [&a], Timestamp::from_secs(15.0), &t).len(), 1);
            assert!(active_contacts(&b, [&a], Timestamp::from_secs(15.5), &t).is_empty());
        }

        #[test]
        fn out_of_range_stays_dark() {
            let t = Tuning::default();
            let mut a = boat("a", 0.0, 0.0, 50.0);
            let b = boat("b", 600.0, 0.0, 50.0);
            a.record_ping(Timestamp::from_secs(1.0));
            assert!(active_contacts(&a, [&b], Timestamp::from_secs(2.0), &t).is_empty());
        }
    }

    mod passive_tests {
        use super::*;

        #[test]
        fn hears_inside_range_only() {
            let t = Tuning::default();
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            let a = boat("a", 0.0, 0.0, 50.0);
            let near = boat("near", t.passive_sonar_range - 10.0, 0.0, 50.0);
            let far = boat("far", t.passive_sonar_range + 10.0, 0.0, 50.0);
            let heard = passive_contacts(&a, [&near, &far], &t, &mut rng);
            assert_eq!(heard.len(), 1);
            assert_eq!(heard[0].id, PlayerId::from("near"));
        }

        #[test]
        fn dead_boats_are_silent_and_deaf() {
            let t = Tuning::default();
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            let a = boat("a", 0.0, 0.0, 50.0);
            let b = dead(boat("b", 10.0, 0.0, 50.0));
            assert!(passive_contacts(&a, [&b], &t, &mut rng).is_empty());
            assert!(passive_contacts(&b, [&a], &t, &mut rng).is_empty());
        }

        #[test]
        fn readings_jitter_between_calls() {
            let t = Tuning::default();
            let mut rng = ChaCha8Rng::seed_from_u64(9);
            let a = boat("a", 0.0, 0.0, 50.0);
            let b = boat("b", 100.0, 0.0, 50.0);
            let first = passive_contacts(&a, [&b], &t, &mut rng);
            let second = passive_contacts(&a, [&b], &t, &mut rng);
            assert_ne!(first[0].distance, second[0].distance);
        }

        #[test]
        fn zero_noise_is_exact() {
            let t = Tuning {
                passive_noise_bearing: 0.0,
                passive_noise_distance: 0.0,
                ..Tuning::default()
            };
            let mut rng = ChaCha8Rng::seed_from_u64(2);
            let (d, b) = apply_passive_noise(250.0, 359.5, &t, &mut rng);
            assert_eq!(d, 250.0);
            assert_eq!(b, 359.5);
        }

        proptest! {
            #[test]
            fn noise_stays_within_bounds(
                seed in any::<u64>(),
                distance in 1.0f64..750.0,
                true_bearing in 0.0f64..360.0,
            ) {
                let t = Tuning::default();
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let (d, b) = apply_passive_noise(distance, true_bearing, &t, &mut rng);
                let lo = distance * (1.0 - t.passive_noise_distance);
                let hi = distance * (1.0 + t.passive_noise_distance);
                prop_assert!(d >= lo - 1e-9 && d <= hi + 1e-9);
                prop_assert!((0.0..360.0).contains(&b));
                prop_assert!(angular_difference(b, true_bearing).abs() <= t.passive_noise_bearing + 1e-9);
            }
        }
    }
}
