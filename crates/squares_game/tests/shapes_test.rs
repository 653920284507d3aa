//! Orientation engine properties over the whole catalog.

use squares_game::{
    Orientation, ShapeId, available_orientations, catalog_shape, next_orientation,
    prev_orientation, shape,
};

#[test]
fn test_quarter_turn_four_times_is_identity() {
    for id in ShapeId::all() {
        let base = catalog_shape(id);
        let quarter = Orientation::new(1);
        let turned = base.rotate(quarter).rotate(quarter).rotate(quarter).rotate(quarter);
        assert_eq!(turned.normalized_cells(), base.normalized_cells(), "shape {id}");
        assert_eq!((turned.width(), turned.height()), (base.width(), base.height()));
    }
}

#[test]
fn test_every_orientation_has_order_dividing_four() {
    for id in ShapeId::all() {
        let base = catalog_shape(id);
        for o in Orientation::ALL {
            let mut current = base.clone();
            for _ in 0..4 {
                current = current.rotate(o);
            }
            assert_eq!(current.normalized_cells(), base.normalized_cells(), "shape {id} {o}");
        }
    }
}

#[test]
fn test_orientation_counts_follow_symmetry_flags() {
    for id in ShapeId::all() {
        let base = catalog_shape(id);
        let count = available_orientations(id).len();
        let expected = match (base.mirror_symmetric(), base.rotation_symmetric()) {
            (true, true) if base.width() == base.height() => 1,
            (true, true) => 2,
            (true, false) | (false, true) => 4,
            (false, false) => 8,
        };
        assert_eq!(count, expected, "shape {id}");
    }
    let single: Vec<u8> = ShapeId::all()
        .filter(|id| available_orientations(*id).len() == 1)
        .map(u8::from)
        .collect();
    assert_eq!(single, vec![0, 8, 16]);
}

#[test]
fn test_distinct_orientations_cover_every_transform_once() {
    for id in ShapeId::all() {
        let distinct: Vec<_> = available_orientations(id)
            .iter()
            .map(|o| shape(id, o).normalized_cells())
            .collect();
        for (i, a) in distinct.iter().enumerate() {
            for b in &distinct[i + 1..] {
                assert_ne!(a, b, "shape {id} lists a duplicate orientation");
            }
        }
        for o in Orientation::ALL {
            let cells = shape(id, o).normalized_cells();
            assert!(distinct.contains(&cells), "shape {id} {o} is not covered");
        }
    }
}

#[test]
fn test_cycling_visits_whole_mask() {
    for id in ShapeId::all() {
        let mask = available_orientations(id);
        let mut seen = Vec::new();
        let mut o = Orientation::IDENTITY;
        for _ in 0..mask.len() {
            seen.push(o);
            o = next_orientation(id, o);
        }
        assert_eq!(o, Orientation::IDENTITY, "shape {id} did not wrap");
        assert_eq!(seen, mask.iter().collect::<Vec<_>>());
        for member in mask.iter() {
            assert_eq!(prev_orientation(id, next_orientation(id, member)), member);
        }
    }
}
