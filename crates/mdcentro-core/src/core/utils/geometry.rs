use nalgebra::{Matrix3, Point3, Vector3};
use thiserror::Error;

const SVD_MAX_ITERATIONS: usize = 10_000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Coordinate sets differ in length ({0} vs {1})")]
    LengthMismatch(usize, usize),
    #[error("Cannot superpose empty coordinate sets")]
    Empty,
    #[error("Singular value decomposition of the covariance matrix did not converge")]
    SvdFailed,
}

/// A proper rigid-body transform mapping mobile coordinates onto a target.
///
/// Applied as `x' = R * (x - mobile_centroid) + target_centroid`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: Matrix3<f64>,
    pub mobile_centroid: Point3<f64>,
    pub target_centroid: Point3<f64>,
}

impl RigidTransform {
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            mobile_centroid: Point3::origin(),
            target_centroid: Point3::origin(),
        }
    }

    #[inline]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.target_centroid + self.rotation * (point - self.mobile_centroid)
    }

    pub fn apply_all(&self, points: &mut [Point3<f64>]) {
        for p in points.iter_mut() {
            *p = self.apply(p);
        }
    }
}

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    Some(Point3::from(sum / points.len() as f64))
}

/// Plain RMSD between two coordinate sets without any fitting.
pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

/// Computes the least-squares rigid superposition of `mobile` onto `target` (Kabsch).
///
/// The rotation is always proper: when the optimal orthogonal matrix would be a
/// reflection, the axis with the smallest singular value is flipped.
pub fn superposition(
    mobile: &[Point3<f64>],
    target: &[Point3<f64>],
) -> Result<RigidTransform, GeometryError> {
    if mobile.len() != target.len() {
        return Err(GeometryError::LengthMismatch(mobile.len(), target.len()));
    }
    let mobile_centroid = centroid(mobile).ok_or(GeometryError::Empty)?;
    let target_centroid = centroid(target).ok_or(GeometryError::Empty)?;

    let mut covariance = Matrix3::<f64>::zeros();
    for (m, t) in mobile.iter().zip(target.iter()) {
        let dm = m - mobile_centroid;
        let dt = t - target_centroid;
        covariance += dm * dt.transpose();
    }

    let svd = covariance
        .try_svd(true, true, f64::EPSILON, SVD_MAX_ITERATIONS)
        .ok_or(GeometryError::SvdFailed)?;
    let u = svd.u.ok_or(GeometryError::SvdFailed)?;
    let v = svd.v_t.ok_or(GeometryError::SvdFailed)?.transpose();

    let mut correction = Matrix3::<f64>::identity();
    if (v * u.transpose()).determinant() < 0.0 {
        let smallest = svd
            .singular_values
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .unwrap_or(2);
        correction[(smallest, smallest)] = -1.0;
    }

    Ok(RigidTransform {
        rotation: v * correction * u.transpose(),
        mobile_centroid,
        target_centroid,
    })
}

/// RMSD between two coordinate sets after optimal superposition.
///
/// Never exceeds the RMSD obtained by centroid matching alone, so sets that
/// coincide up to translation report exactly zero.
pub fn superposed_rmsd(
    mobile: &[Point3<f64>],
    target: &[Point3<f64>],
) -> Result<f64, GeometryError> {
    let transform = superposition(mobile, target)?;
    let n = mobile.len() as f64;

    let mut fitted = 0.0;
    let mut centered_only = 0.0;
    for (m, t) in mobile.iter().zip(target.iter()) {
        fitted += (transform.apply(m) - t).norm_squared();
        let shifted = t - transform.target_centroid;
        centered_only += ((m - transform.mobile_centroid) - shifted).norm_squared();
    }

    Ok((fitted.min(centered_only) / n).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Rotation3, Unit};

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn sample_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5, 0.0, 0.0),
            Point3::new(1.5, 1.2, 0.3),
            Point3::new(-0.4, 2.0, 1.1),
            Point3::new(0.7, -1.3, 2.2),
        ]
    }

    #[test]
    fn centroid_is_mean_of_points() {
        let c = centroid(&[Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, -6.0)]).unwrap();
        assert_eq!(c, Point3::new(1.0, 2.0, -3.0));
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn calculate_rmsd_handles_mismatched_and_empty_sets() {
        let a = sample_points();
        assert!(calculate_rmsd(&a, &a[..2]).is_none());
        assert!(calculate_rmsd(&[], &[]).is_none());
        assert!(f64_approx_equal(calculate_rmsd(&a, &a).unwrap(), 0.0));
    }

    #[test]
    fn superposition_recovers_rotation_and_translation() {
        let target = sample_points();
        let rotation =
            Rotation3::from_axis_angle(&Unit::new_normalize(Vector3::new(1.0, 2.0, 0.5)), 1.1);
        let shift = Vector3::new(3.0, -7.0, 12.0);
        let mobile: Vec<_> = target.iter().map(|p| rotation * p + shift).collect();

        let transform = superposition(&mobile, &target).unwrap();
        for (m, t) in mobile.iter().zip(target.iter()) {
            let fitted = transform.apply(m);
            assert!((fitted - t).norm() < 1e-9);
        }
        assert!(transform.rotation.determinant() > 0.0);
    }

    #[test]
    fn superposition_never_returns_a_reflection() {
        let target = sample_points();
        let mirrored: Vec<_> = target.iter().map(|p| Point3::new(-p.x, p.y, p.z)).collect();

        let transform = superposition(&mirrored, &target).unwrap();
        assert!(f64_approx_equal(transform.rotation.determinant(), 1.0));
    }

    #[test]
    fn superposition_rejects_length_mismatch_and_empty_input() {
        let a = sample_points();
        assert_eq!(
            superposition(&a, &a[..3]).unwrap_err(),
            GeometryError::LengthMismatch(5, 3)
        );
        assert_eq!(superposition(&[], &[]).unwrap_err(), GeometryError::Empty);
    }

    #[test]
    fn superposed_rmsd_is_zero_for_identical_sets() {
        let a = sample_points();
        assert_eq!(superposed_rmsd(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn superposed_rmsd_ignores_rigid_motion() {
        let target = sample_points();
        let rotation = Rotation3::from_euler_angles(0.3, -0.8, 2.0);
        let mobile: Vec<_> = target
            .iter()
            .map(|p| rotation * p + Vector3::new(1.0, 1.0, 1.0))
            .collect();
        assert!(superposed_rmsd(&mobile, &target).unwrap() < 1e-9);
    }

    #[test]
    fn superposed_rmsd_is_bounded_by_unfitted_rmsd() {
        let target = sample_points();
        let mut mobile = target.clone();
        mobile[3] = Point3::new(0.0, 3.0, 1.0);

        let fitted = superposed_rmsd(&mobile, &target).unwrap();
        let raw = calculate_rmsd(&mobile, &target).unwrap();
        assert!(fitted > 0.0);
        assert!(fitted <= raw + 1e-12);
    }
}
