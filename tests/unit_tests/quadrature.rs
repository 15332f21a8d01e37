use coolfluid::quadrature::QuadratureRule;
use coolfluid::shape_function::GeoShape;
use matrixcompare::assert_scalar_eq;

fn factorial(n: i32) -> f64 {
    (1..=n).map(f64::from).product()
}

fn binomial(n: i32, k: i32) -> f64 {
    factorial(n) / (factorial(k) * factorial(n - k))
}

/// Integral of x^a y^b over the reference triangle with vertices (-1, -1), (1, -1), (-1, 1).
fn triangle_monomial_integral(a: i32, b: i32) -> f64 {
    // x = 2s - 1 and y = 2t - 1 map the unit simplex onto the reference triangle, and
    // the integral of s^i t^j over the unit simplex is i! j! / (i + j + 2)!
    let mut integral = 0.0;
    for i in 0..=a {
        for j in 0..=b {
            let sign = if (a - i + b - j) % 2 == 0 { 1.0 } else { -1.0 };
            let coefficient = binomial(a, i) * binomial(b, j) * 2f64.powi(i + j) * sign;
            integral += coefficient * factorial(i) * factorial(j) / factorial(i + j + 2);
        }
    }
    4.0 * integral
}

#[test]
fn reference_measures() {
    let cases = [(GeoShape::Line, 2.0), (GeoShape::Triangle, 2.0), (GeoShape::Quad, 4.0)];
    for (shape, measure) in cases {
        for order in 0..5 {
            let rule = QuadratureRule::<f64>::for_shape(shape, order).unwrap();
            assert_eq!(rule.dim(), shape.dimensionality());
            let sum: f64 = rule.weights().iter().sum();
            assert_scalar_eq!(sum, measure, comp = abs, tol = 1e-12);
        }
    }
}

#[test]
fn gauss_line_is_exact_to_degree_2n_minus_1() {
    for n in 1..6 {
        let rule = QuadratureRule::<f64>::gauss_line(n);
        assert_eq!(rule.num_points(), n);
        for degree in 0..2 * n as i32 {
            let exact = if degree % 2 == 0 { 2.0 / (degree as f64 + 1.0) } else { 0.0 };
            let integral = rule.integrate(|xi| xi[0].powi(degree));
            assert_scalar_eq!(integral, exact, comp = abs, tol = 1e-12);
        }
    }
}

#[test]
fn for_shape_is_exact_for_requested_order() {
    for order in 0..6 {
        let rule = QuadratureRule::<f64>::for_shape(GeoShape::Quad, order).unwrap();
        let degree = order as i32;
        let exact_1d = |k: i32| if k % 2 == 0 { 2.0 / (k as f64 + 1.0) } else { 0.0 };
        let integral = rule.integrate(|xi| xi[0].powi(degree) * xi[1].powi(degree));
        assert_scalar_eq!(integral, exact_1d(degree) * exact_1d(degree), comp = abs, tol = 1e-12);
    }

    for order in 0..6 {
        let rule = QuadratureRule::<f64>::for_shape(GeoShape::Triangle, order).unwrap();
        for a in 0..=order as i32 {
            let b = order as i32 - a;
            let integral = rule.integrate(|xi| xi[0].powi(a) * xi[1].powi(b));
            assert_scalar_eq!(integral, triangle_monomial_integral(a, b), comp = abs, tol = 1e-11);
        }
    }
}

#[test]
fn points_lie_in_reference_triangle() {
    let rule = QuadratureRule::<f64>::triangle(6).unwrap();
    for (_, xi) in rule.iter() {
        assert!(xi[0] >= -1.0 && xi[1] >= -1.0 && xi[0] + xi[1] <= 1e-12);
    }
}

#[test]
fn from_parts() {
    let rule = QuadratureRule::from_parts(vec![1.0, 1.0], vec![-0.5, 0.5], 1);
    assert_eq!(rule.point(1), &[0.5]);
    assert_eq!(rule.integrate(|xi| xi[0] * xi[0]), 0.5);
}
