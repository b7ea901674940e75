// Eigen-like aliases.
pub type Vector3d = nalgebra::Vector3::<f64>;
pub type Matrixd = nalgebra::DMatrix::<f64>;

// A marker observation in capture coordinates (millimeters).
pub type Point = Vector3d;

pub fn to_array(p: &Point) -> [f64; 3] {
  [p[0], p[1], p[2]]
}

pub fn from_array(a: &[f64; 3]) -> Point {
  Point::new(a[0], a[1], a[2])
}
