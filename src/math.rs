use crate::all::*;

// Threshold for treating singular values as zero in least squares fits.
const SVD_EPS: f64 = 1e-12;

// Euclidean distances, `rows[i]` to `cols[j]` at `(i, j)`.
pub fn distance_matrix(rows: &[Point], cols: &[Point]) -> Matrixd {
  DMatrix::from_fn(rows.len(), cols.len(), |i, j| (rows[i] - cols[j]).norm())
}

pub fn mean(points: &[Point]) -> Point {
  assert!(!points.is_empty());
  points.iter().fold(Point::zeros(), |acc, p| acc + p) / points.len() as f64
}

// Polynomial with one coefficient vector per power of `t`, lowest power first.
// Each axis of the point is fitted independently, the coefficient vectors
// just hold the three axes side by side.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
  pub coefficients: Vec<Vector3d>,
}

impl Polynomial {
  pub fn constant(p: Point) -> Polynomial {
    Polynomial { coefficients: vec![p] }
  }

  // Least squares fit of `points` sampled at `times`.
  // The degree is clamped to `points.len() - 1` so that the system is never
  // underdetermined. Degree zero is the mean.
  pub fn fit(times: &[f64], points: &[Point], max_degree: usize) -> Polynomial {
    assert_eq!(times.len(), points.len());
    assert!(!points.is_empty());
    let n = points.len();
    let degree = usize::min(max_degree, n - 1);
    if degree == 0 {
      return Polynomial::constant(mean(points));
    }

    let a = DMatrix::from_fn(n, degree + 1, |i, j| times[i].powi(j as i32));
    let b = DMatrix::from_fn(n, 3, |i, j| points[i][j]);
    match a.svd(true, true).solve(&b, SVD_EPS) {
      Ok(x) => Polynomial {
        coefficients: (0..=degree)
          .map(|k| Vector3d::new(x[(k, 0)], x[(k, 1)], x[(k, 2)]))
          .collect(),
      },
      Err(err) => {
        warn!("Polynomial fit failed ({}), using mean instead.", err);
        Polynomial::constant(mean(points))
      },
    }
  }

  pub fn degree(&self) -> usize {
    self.coefficients.len() - 1
  }

  pub fn eval(&self, t: f64) -> Point {
    // Horner.
    self.coefficients.iter().rev().fold(Point::zeros(), |acc, c| acc * t + c)
  }
}

// Degree used for extrapolating from `n` samples at the end of a fragment.
pub fn extrapolation_degree(n: usize) -> usize {
  match n {
    0 | 1 => 0,
    2 | 3 => 1,
    _ => 2,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_distance_matrix() {
    let rows = [Point::new(0., 0., 0.), Point::new(1., 0., 0.)];
    let cols = [Point::new(0., 3., 4.), Point::new(1., 0., 0.), Point::new(2., 0., 0.)];
    let d = distance_matrix(&rows, &cols);
    assert_eq!(d.nrows(), 2);
    assert_eq!(d.ncols(), 3);
    assert!((d[(0, 0)] - 5.).abs() < 1e-12);
    assert!((d[(1, 1)]).abs() < 1e-12);
    assert!((d[(0, 2)] - 2.).abs() < 1e-12);

    let empty = distance_matrix(&rows, &[]);
    assert_eq!(empty.ncols(), 0);
  }

  #[test]
  fn test_fit_quadratic() {
    let times: Vec<f64> = (-5..0).map(|t| t as f64).collect();
    let points: Vec<Point> = times.iter()
      .map(|&t| Point::new(t * t, 2. * t + 1., -3.))
      .collect();
    let p = Polynomial::fit(&times, &points, 2);
    assert_eq!(p.degree(), 2);
    assert!((p.eval(2.) - Point::new(4., 5., -3.)).norm() < 1e-9);
    assert!((p.eval(-0.5) - Point::new(0.25, 0., -3.)).norm() < 1e-9);
  }

  #[test]
  fn test_fit_degree_is_clamped() {
    let times = [0., 1.];
    let points = [Point::new(0., 0., 0.), Point::new(1., 2., 3.)];
    let p = Polynomial::fit(&times, &points, 2);
    assert_eq!(p.degree(), 1);
    assert!((p.eval(2.) - Point::new(2., 4., 6.)).norm() < 1e-9);

    let p = Polynomial::fit(&[7.], &[Point::new(1., 1., 1.)], 2);
    assert_eq!(p.degree(), 0);
    assert_eq!(p.eval(100.), Point::new(1., 1., 1.));
  }

  #[test]
  fn test_extrapolation_degree() {
    assert_eq!(extrapolation_degree(1), 0);
    assert_eq!(extrapolation_degree(2), 1);
    assert_eq!(extrapolation_degree(3), 1);
    assert_eq!(extrapolation_degree(4), 2);
    assert_eq!(extrapolation_degree(10), 2);
  }
}
