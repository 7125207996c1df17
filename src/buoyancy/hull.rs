//! Convex waterline footprint via a Graham scan in the XZ plane.

use std::cmp::Ordering;

use glam::Vec2;

/// Cosines closer than this count as the same direction from the pivot
const SAME_ANGLE: f32 = 1e-6;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    point: Vec2,
    cos: f32,
    distance2: f32,
}

/// `< 0` when `p` turns clockwise from edge `a → b`
fn turn(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y)
}

/// Convex hull of `points` (x, z).
///
/// The pivot is the point with the largest z (ties: largest x); the rest are
/// ordered by the cosine of their direction from the pivot, keeping only the
/// farthest point per direction. Returns an empty hull for no input, and the
/// distinct points when fewer than three remain.
pub fn compute_convex_footprint(points: &[Vec2]) -> Vec<Vec2> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let pivot = points.iter().skip(1).fold(first, |best, &p| {
        if p.y > best.y || (p.y == best.y && p.x > best.x) {
            p
        } else {
            best
        }
    });

    let mut candidates: Vec<Candidate> = points
        .iter()
        .filter_map(|&point| {
            let distance2 = point.distance_squared(pivot);
            (distance2 > 0.0).then(|| Candidate {
                point,
                cos: (point.x - pivot.x) / distance2.sqrt(),
                distance2,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.cos
            .partial_cmp(&a.cos)
            .unwrap_or(Ordering::Equal)
            .then(b.distance2.partial_cmp(&a.distance2).unwrap_or(Ordering::Equal))
    });

    // one point per direction: the farthest within SAME_ANGLE of the group's first cosine
    let mut directions: Vec<Candidate> = Vec::with_capacity(candidates.len());
    let mut group_cos = f32::NAN;
    for candidate in candidates {
        match directions.last_mut() {
            Some(kept) if (candidate.cos - group_cos).abs() <= SAME_ANGLE => {
                if candidate.distance2 > kept.distance2 {
                    *kept = candidate;
                }
            }
            _ => {
                group_cos = candidate.cos;
                directions.push(candidate);
            }
        }
    }

    let mut hull = vec![pivot];
    for candidate in directions {
        let p = candidate.point;
        while hull.len() >= 2 && turn(hull[hull.len() - 2], hull[hull.len() - 1], p) >= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_single() {
        assert!(compute_convex_footprint(&[]).is_empty());
        assert_eq!(compute_convex_footprint(&[Vec2::ONE]), vec![Vec2::ONE]);
        assert_eq!(
            compute_convex_footprint(&[Vec2::ONE, Vec2::ONE]),
            vec![Vec2::ONE]
        );
    }

    #[test]
    fn test_unit_square() {
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let hull = compute_convex_footprint(&points);
        assert_eq!(
            hull,
            vec![
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_interior_and_duplicate_points_dropped() {
        let points = [
            Vec2::new(0.6, 0.3),
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(0.2, 0.4),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 1.0),
        ];
        let hull = compute_convex_footprint(&points);
        assert_eq!(hull.len(), 4);
        for corner in [Vec2::ZERO, Vec2::new(2.0, 0.0), Vec2::splat(2.0), Vec2::new(0.0, 2.0)] {
            assert!(hull.contains(&corner));
        }
    }

    #[test]
    fn test_collinear_keeps_farthest() {
        // (1, 1) lies between the pivot (2, 2) and (0, 0)
        let points = [Vec2::splat(2.0), Vec2::ONE, Vec2::ZERO, Vec2::new(2.0, 0.0)];
        let hull = compute_convex_footprint(&points);
        assert_eq!(hull.len(), 3);
        assert!(!hull.contains(&Vec2::ONE));
    }

    #[test]
    fn test_hull_is_convex() {
        let points: Vec<Vec2> = (0..40)
            .map(|k| {
                let a = k as f32 * 0.7;
                let r = 1.0 + 0.3 * (k as f32 * 1.3).sin();
                Vec2::new(r * a.cos(), r * a.sin())
            })
            .collect();
        let hull = compute_convex_footprint(&points);
        assert!(hull.len() >= 3);
        let n = hull.len();
        for k in 0..n {
            let (a, b) = (hull[k], hull[(k + 1) % n]);
            for p in &points {
                assert!(turn(a, b, *p) <= 1e-4, "point {p:?} outside edge {k}");
            }
        }
    }

    #[test]
    fn test_near_equal_angles_keep_farthest() {
        // (-1, -0.001) and (-10, 0) differ in cosine by less than SAME_ANGLE
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(-10.0, 0.0),
            Vec2::new(-1.0, -0.001),
            Vec2::new(-5.0, -3.0),
        ];
        let hull = compute_convex_footprint(&points);
        assert_eq!(
            hull,
            vec![Vec2::new(0.0, 0.0), Vec2::new(-5.0, -3.0), Vec2::new(-10.0, 0.0)]
        );
    }
}
