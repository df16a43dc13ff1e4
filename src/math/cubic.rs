//! Mathematical functions.

use crate::error::FitError;
use cgmath::{Matrix4, SquareMatrix, Vector4};
use serde::{Deserialize, Serialize};

/// Two x-values closer than this are considered to be the same sample.
const DISTINCT_X_TOLERANCE: f64 = 1e-3;

/// A cubic function.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct CubicFn {
    coeffs: [f64; 4],
    offset: f64,
}

impl CubicFn {
    /// Creates a cubic passing through `(x1, y1)` and `(x2, y2)`
    /// with a zero derivative at both ends.
    pub fn from_ends(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let (x, y) = (x2 - x1, y2 - y1);
        let a = -2.0 * y * x.powi(-3);
        let b = 3.0 * y * x.powi(-2);
        let coeffs = [a, b, 0.0, y1];
        let offset = -x1;
        Self { coeffs, offset }
    }

    /// Fits a cubic to a set of `(x, y)` samples in the least-squares sense.
    ///
    /// At least four samples with distinct x-values are needed for the fit to be determined.
    pub fn least_squares(points: &[(f64, f64)]) -> Result<Self, FitError> {
        if points.len() < 4 {
            return Err(FitError::TooFewPoints {
                count: points.len(),
            });
        }

        let distinct = count_distinct(points.iter().map(|(x, _)| *x));
        if distinct < 4 {
            return Err(FitError::Degenerate { distinct });
        }

        // Normalise x into [-1, 1] to keep the normal equations well conditioned
        let scale = points
            .iter()
            .map(|(x, _)| x.abs())
            .fold(0.0, f64::max);

        let mut sums = [0.0; 7];
        let mut rhs = [0.0; 4];
        for (x, y) in points {
            let u = x / scale;
            let mut pow = 1.0;
            for (k, sum) in sums.iter_mut().enumerate() {
                *sum += pow;
                if k < 4 {
                    rhs[k] += y * pow;
                }
                pow *= u;
            }
        }

        // Unknowns are ordered [d, c, b, a], i.e. ascending powers of u
        let col = |j: usize| Vector4::new(sums[j], sums[j + 1], sums[j + 2], sums[j + 3]);
        let normal = Matrix4::from_cols(col(0), col(1), col(2), col(3));
        let solved = normal.invert().ok_or(FitError::Singular)?
            * Vector4::new(rhs[0], rhs[1], rhs[2], rhs[3]);

        let coeffs = [
            solved.w / scale.powi(3),
            solved.z / scale.powi(2),
            solved.y / scale,
            solved.x,
        ];
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(FitError::Singular);
        }

        Ok(Self {
            coeffs,
            offset: 0.0,
        })
    }

    pub fn y(&self, x: f64) -> f64 {
        self.y_and_dy(x).0
    }

    pub fn dy(&self, x: f64) -> f64 {
        self.y_and_dy(x).1
    }

    pub fn y_and_dy(&self, x: f64) -> (f64, f64) {
        let c = &self.coeffs;
        let x = x + self.offset;

        let y = c[0] * x * x * x + c[1] * x * x + c[2] * x + c[3];
        let dy = c[0] * 3. * x * x + c[1] * 2. * x + c[2];

        (y, dy)
    }
}

/// Counts the values which differ from all others by more than the tolerance.
fn count_distinct(xs: impl Iterator<Item = f64>) -> usize {
    let mut xs: Vec<f64> = xs.collect();
    xs.sort_by(f64::total_cmp);
    let mut count = 0;
    let mut last = f64::NEG_INFINITY;
    for x in xs {
        if x - last > DISTINCT_X_TOLERANCE {
            count += 1;
            last = x;
        }
    }
    count
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng};

    #[test]
    pub fn from_ends() {
        let cubic = CubicFn::from_ends(10., 20., 45.0, 5.0);
        assert_approx_eq!(cubic.y(10.), 20., 0.01);
        assert_approx_eq!(cubic.dy(10.), 0., 0.01);
        assert_approx_eq!(cubic.y(45.), 5., 0.01);
        assert_approx_eq!(cubic.dy(45.), 0., 0.01);
    }

    #[test]
    pub fn least_squares_recovers_exact_cubic() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Vegemite sandwhich is not fun...");
        for _i in 0..100 {
            let coeffs: [f64; 4] = [
                rng.gen_range(-0.01..0.01),
                rng.gen_range(-0.1..0.1),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-10.0..10.0),
            ];
            let truth = CubicFn { coeffs, offset: 0.0 };
            let points: Vec<_> = (0..12)
                .map(|i| {
                    let x = 2.0 * i as f64 + 0.5;
                    (x, truth.y(x))
                })
                .collect();
            let cubic = CubicFn::least_squares(&points).unwrap();

            assert_approx_eq!(cubic.y(0.0), coeffs[3], 1e-6);
            assert_approx_eq!(cubic.y(10.0), truth.y(10.0), 1e-6);
        }
    }

    #[test]
    pub fn least_squares_rejects_degenerate_input() {
        assert_eq!(
            CubicFn::least_squares(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]),
            Err(FitError::TooFewPoints { count: 3 })
        );

        let points = [(5.0, 0.0), (5.0, 1.0), (5.0, 2.0), (5.0, 3.0), (5.0001, 4.0)];
        assert_eq!(
            CubicFn::least_squares(&points),
            Err(FitError::Degenerate { distinct: 1 })
        );
    }
}
