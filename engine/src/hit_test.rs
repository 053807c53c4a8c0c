#![allow(clippy::float_cmp)]

use std::f64::consts::FRAC_PI_4;

use super::*;
use crate::doc::{DocumentId, ObjectKind, Transform};

const ROOT: ObjectId = ObjectId(1);

fn doc_with_boxes(boxes: &[(u32, f64, f64, f64, f64)]) -> DocStore {
    let mut doc = DocStore::new(DocumentId(1), ROOT);
    for (id, x, y, w, h) in boxes {
        let oid = ObjectId(*id);
        assert!(doc.insert(oid, ROOT, format!("box-{id}"), ObjectKind::Svg { width: *w, height: *h }));
        doc.set_transform(oid, Transform { position: (*x, *y), ..Transform::default() });
    }
    doc
}

#[test]
fn empty_document_hits_nothing() {
    let doc = doc_with_boxes(&[]);
    assert_eq!(hit_test(Point::new(0.0, 0.0), &doc), None);
}

#[test]
fn point_inside_box_hits_it() {
    let doc = doc_with_boxes(&[(2, 10.0, 10.0, 50.0, 20.0)]);
    assert_eq!(hit_test(Point::new(30.0, 25.0), &doc), Some(ObjectId(2)));
    assert_eq!(hit_test(Point::new(61.0, 25.0), &doc), None);
}

#[test]
fn edges_count_as_inside() {
    let doc = doc_with_boxes(&[(2, 0.0, 0.0, 10.0, 10.0)]);
    assert_eq!(hit_test(Point::new(10.0, 10.0), &doc), Some(ObjectId(2)));
}

#[test]
fn topmost_overlapping_object_wins() {
    let doc = doc_with_boxes(&[(2, 0.0, 0.0, 100.0, 100.0), (3, 50.0, 50.0, 100.0, 100.0)]);
    assert_eq!(hit_test(Point::new(75.0, 75.0), &doc), Some(ObjectId(3)));
    assert_eq!(hit_test(Point::new(25.0, 25.0), &doc), Some(ObjectId(2)));
}

#[test]
fn rotation_is_respected() {
    let mut doc = doc_with_boxes(&[(2, 0.0, 0.0, 100.0, 10.0)]);
    doc.set_transform(ObjectId(2), Transform { rotation: FRAC_PI_4, ..Transform::default() });
    // Along the rotated diagonal.
    assert_eq!(hit_test(Point::new(40.0, 42.0), &doc), Some(ObjectId(2)));
    // Inside the unrotated box, outside the rotated one.
    assert_eq!(hit_test(Point::new(90.0, 5.0), &doc), None);
}

#[test]
fn zero_scale_object_is_never_hit() {
    let mut doc = doc_with_boxes(&[(2, 0.0, 0.0, 10.0, 10.0)]);
    doc.set_transform(ObjectId(2), Transform { scale: (0.0, 0.0), ..Transform::default() });
    assert_eq!(hit_test(Point::new(0.0, 0.0), &doc), None);
}

#[test]
fn world_bounds_of_scaled_box() {
    let mut doc = doc_with_boxes(&[(2, 0.0, 0.0, 10.0, 20.0)]);
    doc.set_transform(ObjectId(2), Transform { position: (5.0, 5.0), rotation: 0.0, scale: (2.0, 0.5) });
    let b = world_bounds(&doc, ObjectId(2)).unwrap();
    assert_eq!(b, Bounds { min_x: 5.0, min_y: 5.0, max_x: 25.0, max_y: 15.0 });
    assert!(b.is_finite());
    assert!(b.contains(Point::new(25.0, 15.0)));
}

#[test]
fn world_bounds_of_unknown_object_is_none() {
    let doc = doc_with_boxes(&[]);
    assert!(world_bounds(&doc, ObjectId(9)).is_none());
    assert!(!contains_point(&doc, ROOT, Point::new(0.0, 0.0)));
}
