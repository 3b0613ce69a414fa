//! Natural cubic spline interpolation.
//!
//! Used by the Fitzpatrick (1999) extinction law, whose optical/IR segment is
//! defined as a cubic spline through nine published anchor points.

/// Natural cubic spline through a fixed set of knots.
///
/// Second derivatives vanish at the endpoints; between knots the curve is a
/// piecewise cubic with continuous first and second derivatives.
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivative of the spline at each knot.
    d2: Vec<f64>,
}

impl CubicSpline {
    /// Build the spline. Knot abscissae must be strictly ascending and there
    /// must be at least two of them; callers pass fixed published anchors, so
    /// violations are programming errors and panic.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        assert_eq!(x.len(), y.len(), "knot arrays must have the same length");
        assert!(x.len() >= 2, "need at least two knots");
        for i in 1..x.len() {
            assert!(x[i] > x[i - 1], "knots must be strictly ascending");
        }

        let n = x.len();
        let mut d2 = vec![0.0; n];
        if n > 2 {
            // Thomas algorithm on the tridiagonal system for the interior
            // second derivatives; natural boundary keeps d2[0] = d2[n-1] = 0.
            let h: Vec<f64> = (0..n - 1).map(|i| x[i + 1] - x[i]).collect();
            let mut diag = vec![0.0; n];
            let mut rhs = vec![0.0; n];
            for i in 1..n - 1 {
                diag[i] = 2.0 * (h[i - 1] + h[i]);
                rhs[i] = 6.0 * ((y[i + 1] - y[i]) / h[i] - (y[i] - y[i - 1]) / h[i - 1]);
            }
            let mut upper = vec![0.0; n];
            for i in 1..n - 1 {
                if i > 1 {
                    let w = h[i - 1] / diag[i - 1];
                    diag[i] -= w * upper[i - 1];
                    rhs[i] -= w * rhs[i - 1];
                }
                upper[i] = h[i];
            }
            for i in (1..n - 1).rev() {
                d2[i] = (rhs[i] - h[i] * d2[i + 1]) / diag[i];
            }
        }

        CubicSpline { x, y, d2 }
    }

    /// Evaluate the spline at `t`. Outside the knot range the first or last
    /// cubic segment is extended.
    pub fn evaluate(&self, t: f64) -> f64 {
        let n = self.x.len();
        let i = match self.x.binary_search_by(|v| v.total_cmp(&t)) {
            Ok(i) => i.min(n - 2),
            Err(0) => 0,
            Err(i) => (i - 1).min(n - 2),
        };

        let h = self.x[i + 1] - self.x[i];
        let a = (self.x[i + 1] - t) / h;
        let b = (t - self.x[i]) / h;
        a * self.y[i]
            + b * self.y[i + 1]
            + ((a * a * a - a) * self.d2[i] + (b * b * b - b) * self.d2[i + 1]) * h * h / 6.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn passes_through_knots() {
        let x = vec![0.0, 0.5, 1.3, 2.0, 3.7];
        let y = vec![1.0, -0.2, 0.8, 2.5, 2.4];
        let spline = CubicSpline::new(x.clone(), y.clone());
        for (xi, yi) in x.iter().zip(&y) {
            assert_relative_eq!(spline.evaluate(*xi), *yi, epsilon = 1e-12);
        }
    }

    #[test]
    fn linear_data_stays_linear() {
        let x: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v - 1.0).collect();
        let spline = CubicSpline::new(x, y);
        for t in [0.25, 1.9, 3.5, 4.75] {
            assert_relative_eq!(spline.evaluate(t), 3.0 * t - 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn interpolates_smoothly_between_knots() {
        // sin(x) on a fine-ish grid: mid-segment error stays small.
        let x: Vec<f64> = (0..20).map(|i| i as f64 * 0.3).collect();
        let y: Vec<f64> = x.iter().map(|v| v.sin()).collect();
        let spline = CubicSpline::new(x, y);
        for t in [0.45, 1.95, 3.15, 5.0] {
            assert_relative_eq!(spline.evaluate(t), t.sin(), epsilon = 1e-3);
        }
    }
}
