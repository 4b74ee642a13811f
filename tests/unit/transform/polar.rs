use super::*;

use std::f64::consts::PI;

fn table(d: usize) -> TableGeometry {
    TableGeometry::new(d, 20).unwrap()
}

#[test]
fn zero_rho_maps_to_centre_for_any_theta() {
    let g = table(100);
    for theta in [0.0, 0.3, PI / 2.0, PI, -2.5, 17.0 * PI] {
        let p = g.to_grid(PolarPosition::new(theta, 0.0));
        assert_eq!(p, g.center(), "theta={theta}");
    }
}

#[test]
fn geometry_derives_centre_and_radius() {
    let g = table(100);
    assert_eq!(g.diameter(), 100);
    assert_eq!(g.center(), Point::new(50.0, 50.0));
    assert_eq!(g.max_radius(), 30.0);

    let odd = table(101);
    assert_eq!(odd.center(), Point::new(50.0, 50.0));
}

#[test]
fn theta_zero_points_at_row_zero() {
    let g = table(100);
    let p = g.to_grid(PolarPosition::new(0.0, 1.0));
    assert!((p.x - 50.0).abs() < 1e-9);
    assert!((p.y - 20.0).abs() < 1e-9);

    let q = g.to_grid(PolarPosition::new(PI / 2.0, 1.0));
    assert!((q.x - 80.0).abs() < 1e-9);
    assert!((q.y - 50.0).abs() < 1e-9);
}

#[test]
fn to_cell_truncates() {
    let g = table(100);
    assert_eq!(g.to_cell(PolarPosition::new(PI / 2.0, 0.5)), (65, 50));
}

#[test]
fn from_grid_uses_pixel_seeding_convention() {
    let g = table(200);
    let centre = g.from_grid(100.0, 100.0);
    assert_eq!(centre.rho, 0.0);

    let right = g.from_grid(200.0, 100.0);
    assert!((right.rho - 0.5).abs() < 1e-12);
    assert!(right.theta.abs() < 1e-12);

    let below = g.from_grid(100.0, 150.0);
    assert!((below.theta - PI / 2.0).abs() < 1e-12);

    let corner = g.from_grid(0.0, 0.0);
    let expected = (100.0f64 * 100.0 + 100.0 * 100.0).sqrt() / 200.0;
    assert!((corner.rho - expected).abs() < 1e-12);
}

#[test]
fn rejects_degenerate_tables() {
    assert!(TableGeometry::new(0, 0).is_err());
    assert!(TableGeometry::new(40, 20).is_err());
    assert!(TableGeometry::new(42, 20).is_ok());
}
