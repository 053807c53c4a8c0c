#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Point ---

#[test]
fn point_delta_from_subtracts_components() {
    let d = Point::new(10.0, 4.0).delta_from(Point::new(3.0, 6.0));
    assert_eq!(d, Point::new(7.0, -2.0));
}

#[test]
fn point_length_is_euclidean() {
    assert!(approx_eq(Point::new(3.0, 4.0).length(), 5.0));
    assert!(approx_eq(Point::new(0.0, 0.0).length(), 0.0));
}

// --- Camera ---

#[test]
fn default_camera_is_identity() {
    let cam = Camera::default();
    let p = Point::new(50.0, 75.0);
    assert!(point_approx_eq(cam.screen_to_world(p), p));
    assert!(point_approx_eq(cam.world_to_screen(p), p));
}

#[test]
fn screen_to_world_applies_pan_then_zoom() {
    let cam = Camera { pan_x: 50.0, pan_y: 30.0, zoom: 2.0 };
    let world = cam.screen_to_world(Point::new(0.0, 0.0));
    assert!(approx_eq(world.x, -25.0));
    assert!(approx_eq(world.y, -15.0));
}

#[test]
fn world_to_screen_applies_zoom_then_pan() {
    let cam = Camera { pan_x: 20.0, pan_y: 10.0, zoom: 3.0 };
    let screen = cam.world_to_screen(Point::new(5.0, 5.0));
    assert!(approx_eq(screen.x, 35.0));
    assert!(approx_eq(screen.y, 25.0));
}

#[test]
fn conversions_round_trip() {
    let cam = Camera { pan_x: 13.7, pan_y: -42.3, zoom: 0.75 };
    let world = Point::new(333.3, -999.9);
    assert!(point_approx_eq(cam.screen_to_world(cam.world_to_screen(world)), world));
}

