use super::*;
use proptest::prelude::*;

fn bx(left: u32, top: u32, right: u32, bottom: u32) -> CropBox {
    CropBox {
        left,
        top,
        right,
        bottom,
    }
}

#[test]
fn corner_center_clamps_leading_edges_only() {
    let b = clamp_crop(Position::new(0.0, 0.0), CropRadii::uniform(25), 100, 100).unwrap();
    assert_eq!(b, bx(0, 0, 25, 25));
}

#[test]
fn far_corner_clamps_trailing_edges_only() {
    let b = clamp_crop(Position::new(100.0, 90.0), CropRadii::uniform(25), 100, 100).unwrap();
    assert_eq!(b, bx(75, 65, 100, 100));
}

#[test]
fn interior_box_is_unchanged() {
    let radii = CropRadii {
        left: 5,
        right: 10,
        top: 3,
        bottom: 7,
    };
    let b = clamp_crop(Position::new(50.9, 40.2), radii, 100, 100).unwrap();
    assert_eq!(b, bx(45, 37, 60, 47));
}

#[test]
fn one_edge_clamped_leaves_others() {
    let radii = CropRadii {
        left: 30,
        right: 10,
        top: 10,
        bottom: 10,
    };
    let b = clamp_crop(Position::new(20.0, 50.0), radii, 200, 100).unwrap();
    assert_eq!(b, bx(0, 40, 30, 60));
}

#[test]
fn center_outside_image_is_out_of_bounds() {
    for (x, y) in [(-1.0, 5.0), (5.0, -0.5), (101.0, 5.0), (5.0, 100.5), (f64::NAN, 1.0)] {
        let err = clamp_crop(Position::new(x, y), CropRadii::uniform(5), 100, 100).unwrap_err();
        assert!(matches!(err, TrackovlError::OutOfBounds(_)), "({x}, {y})");
    }
}

#[test]
fn empty_region_is_out_of_bounds() {
    let radii = CropRadii {
        left: 0,
        right: 10,
        top: 10,
        bottom: 10,
    };
    let err = clamp_crop(Position::new(100.0, 50.0), radii, 100, 100).unwrap_err();
    assert!(matches!(err, TrackovlError::OutOfBounds(_)));
}

#[test]
fn label_anchor_truncates_then_shifts() {
    let a = label_anchor(Position::new(10.0, 20.0), Shift::new(-4, -5));
    assert_eq!(a, LabelAnchor { x: 6, y: 15 });

    let a = label_anchor(Position::new(50.7, 60.2), Shift::new(-4, -5));
    assert_eq!(a, LabelAnchor { x: 46, y: 55 });

    let a = label_anchor(Position::new(1.0, 2.0), Shift::new(-4, -5));
    assert_eq!(a, LabelAnchor { x: -3, y: -3 });
}

proptest! {
    #[test]
    fn box_inside_image_is_returned_unchanged(
        w in 1u32..400,
        h in 1u32..400,
        fx in 0.0f64..1.0,
        fy in 0.0f64..1.0,
        seeds in (0u32..1000, 0u32..1000, 0u32..1000, 0u32..1000),
    ) {
        let cx = (fx * f64::from(w)).floor() as u32;
        let cy = (fy * f64::from(h)).floor() as u32;
        let radii = CropRadii {
            left: seeds.0 % (cx + 1),
            right: seeds.1 % (w - cx + 1),
            top: seeds.2 % (cy + 1),
            bottom: seeds.3 % (h - cy + 1),
        };
        prop_assume!(radii.left + radii.right > 0 && radii.top + radii.bottom > 0);

        let b = clamp_crop(Position::new(f64::from(cx), f64::from(cy)), radii, w, h).unwrap();
        prop_assert_eq!(
            b,
            bx(cx - radii.left, cy - radii.top, cx + radii.right, cy + radii.bottom)
        );
    }

    #[test]
    fn clamped_box_stays_inside_image(
        w in 1u32..400,
        h in 1u32..400,
        fx in 0.0f64..=1.0,
        fy in 0.0f64..=1.0,
        r in (0u32..600, 0u32..600, 0u32..600, 0u32..600),
    ) {
        let center = Position::new(fx * f64::from(w), fy * f64::from(h));
        let radii = CropRadii { left: r.0, right: r.1, top: r.2, bottom: r.3 };
        if let Ok(b) = clamp_crop(center, radii, w, h) {
            prop_assert!(b.left < b.right && b.right <= w);
            prop_assert!(b.top < b.bottom && b.bottom <= h);
            let cx = center.x.floor() as u32;
            let cy = center.y.floor() as u32;
            prop_assert_eq!(b.left, cx.saturating_sub(r.0));
            prop_assert_eq!(b.top, cy.saturating_sub(r.2));
        }
    }
}
