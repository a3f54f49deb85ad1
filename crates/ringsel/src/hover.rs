use crate::geometry::{Point, normalize_angle};
use crate::item::MenuItem;

/// Pointer position relative to the menu center, with the rotation offset
/// folded into the angle so it can be compared with stored sectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarPointer {
    pub distance: f64,
    pub angle: f64,
}

impl PolarPointer {
    pub fn new(center: Point, rot_offset: f64, pointer: Point) -> Self {
        Self {
            distance: center.distance_to(pointer),
            angle: normalize_angle(center.angle_to(pointer) + rot_offset),
        }
    }
}

/// Index of the first item whose sector and radial band contain the pointer.
/// Radii are read fresh on every call.
pub fn hit_test<P>(
    items: &[MenuItem<P>],
    center: Point,
    rot_offset: f64,
    pointer: Point,
) -> Option<usize> {
    let polar = PolarPointer::new(center, rot_offset, pointer);
    items.iter().position(|item| {
        item.sector().contains(polar.angle) && item.contains_radius(polar.distance)
    })
}
