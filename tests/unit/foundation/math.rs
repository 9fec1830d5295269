use super::*;

#[test]
fn linspace_hits_both_endpoints_and_the_midpoint() {
    let range = SweepRange { from: -2.0, to: 2.0 };
    let xs = linspace(range, SAMPLE_COUNT);
    assert_eq!(xs.len(), SAMPLE_COUNT);
    assert_eq!(xs[0], -2.0);
    assert_eq!(xs[SAMPLE_COUNT / 2], 0.0);
    assert_eq!(xs[SAMPLE_COUNT - 1], 2.0);
}

#[test]
fn sampled_range_is_deterministic() {
    let domain = SweepRange { from: -2.0, to: 2.0 };
    let a = sampled_range(domain, |x| Ok(x * x)).unwrap();
    let b = sampled_range(domain, |x| Ok(x * x)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.from, 0.0);
    assert_eq!(a.to, 4.0);
}

#[test]
fn point_on_circle_parametrization() {
    let p = point_on_circle(Point::new(1.0, 1.0), 2.0, 0.0);
    assert_eq!(p, Point::new(3.0, 1.0));

    let p = point_on_circle(Point::new(0.0, 0.0), 1.0, std::f64::consts::FRAC_PI_2);
    assert!((p.x).abs() < 1e-12);
    assert!((p.y - 1.0).abs() < 1e-12);
}
