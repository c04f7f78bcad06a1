//! Virtual-sphere trackball.
//!
//! A drag between two points in normalized device coordinates is mapped onto a
//! sphere of the given radius; points past `radius / sqrt(2)` land on a
//! hyperbolic sheet instead so the rotation stays defined at the edges.
//!
//! Quaternions here describe the orientation of the camera. The matrix built
//! by [`to_rotation_matrix`] is the matching world-to-eye rotation.

use glam::{Mat4, Quat, Vec3};

/// Rotation that makes the sphere appear to follow the cursor from `p1` to `p2`.
pub fn compute_rotation(p1x: f32, p1y: f32, p2x: f32, p2y: f32, radius: f32) -> Quat {
    if p1x == p2x && p1y == p2y {
        return Quat::IDENTITY;
    }

    let p1 = Vec3::new(p1x, p1y, project_to_sphere(radius, p1x, p1y));
    let p2 = Vec3::new(p2x, p2y, project_to_sphere(radius, p2x, p2y));

    // The camera turns the opposite way to the surface under the cursor
    let axis = p2.cross(p1);
    if axis.length_squared() <= f32::EPSILON * f32::EPSILON {
        return Quat::IDENTITY;
    }

    let t = ((p1 - p2).length() / (2.0 * radius)).clamp(-1.0, 1.0);
    let phi = 2.0 * t.asin();

    Quat::from_axis_angle(axis.normalize(), phi)
}

/// Quaternion product `q1 * q2`, renormalized to keep drift out of long drags.
pub fn compose(q1: Quat, q2: Quat) -> Quat {
    (q1 * q2).normalize()
}

/// World-to-eye rotation for a camera with orientation `q`.
pub fn to_rotation_matrix(q: Quat) -> Mat4 {
    Mat4::from_quat(q).transpose()
}

fn project_to_sphere(radius: f32, x: f32, y: f32) -> f32 {
    let d = (x * x + y * y).sqrt();
    if d < radius * std::f32::consts::FRAC_1_SQRT_2 {
        (radius * radius - d * d).sqrt()
    } else {
        let t = radius * std::f32::consts::FRAC_1_SQRT_2;
        t * t / d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn quat_close(a: Quat, b: Quat) -> bool {
        // q and -q are the same rotation
        a.abs_diff_eq(b, EPS) || a.abs_diff_eq(-b, EPS)
    }

    #[test]
    fn test_identical_points_give_identity() {
        for &(x, y) in &[(0.0, 0.0), (0.3, -0.2), (0.95, 0.95), (-1.0, 1.0)] {
            assert_eq!(compute_rotation(x, y, x, y, 0.8), Quat::IDENTITY);
        }
    }

    #[test]
    fn test_rotation_is_unit_and_nontrivial() {
        let q = compute_rotation(0.0, 0.0, 0.1, 0.0, 0.8);
        assert!((q.length() - 1.0).abs() < EPS);
        assert!(q.w < 1.0);
    }

    #[test]
    fn test_edge_points_use_hyperbolic_sheet() {
        // Both points far outside the sphere still produce a finite rotation
        let q = compute_rotation(1.0, 1.0, 1.0, 0.9, 0.8);
        assert!(q.is_finite());
        assert!((q.length() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_horizontal_drag_turns_scene_with_cursor() {
        let q = compute_rotation(0.0, 0.0, 0.2, 0.0, 0.8);
        let view = to_rotation_matrix(q);
        // A point facing the viewer moves toward +X in eye space
        let moved = view.transform_vector3(Vec3::Z);
        assert!(moved.x > 0.0);
        assert!(moved.y.abs() < EPS);
    }

    #[test]
    fn test_reverse_drag_cancels() {
        let q1 = compute_rotation(0.1, 0.2, 0.3, -0.1, 0.8);
        let q2 = compute_rotation(0.3, -0.1, 0.1, 0.2, 0.8);
        assert!(quat_close(compose(q1, q2), Quat::IDENTITY));
    }

    #[test]
    fn test_compose_is_associative() {
        let q1 = Quat::from_axis_angle(Vec3::X, 0.4);
        let q2 = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0).normalize(), 1.1);
        let q3 = compute_rotation(-0.5, 0.2, 0.4, 0.6, 0.8);
        let left = compose(compose(q1, q2), q3);
        let right = compose(q1, compose(q2, q3));
        assert!(quat_close(left, right));
    }

    #[test]
    fn test_compose_is_not_commutative() {
        let q1 = Quat::from_axis_angle(Vec3::X, std::f32::consts::FRAC_PI_2);
        let q2 = Quat::from_axis_angle(Vec3::Y, std::f32::consts::FRAC_PI_2);
        assert!(!quat_close(compose(q1, q2), compose(q2, q1)));
    }

    #[test]
    fn test_compose_renormalizes() {
        let q = Quat::from_xyzw(0.0, 0.0, 0.0, 1.001);
        let composed = compose(q, q);
        assert!((composed.length() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_rotation_matrix_identity() {
        assert!(to_rotation_matrix(Quat::IDENTITY).abs_diff_eq(Mat4::IDENTITY, EPS));
    }

    #[test]
    fn test_rotation_matrix_is_inverse_of_orientation() {
        let q = Quat::from_axis_angle(Vec3::Z, 0.7);
        let m = to_rotation_matrix(q) * Mat4::from_quat(q);
        assert!(m.abs_diff_eq(Mat4::IDENTITY, EPS));
        assert_eq!(m.w_axis, glam::Vec4::W);
    }
}
