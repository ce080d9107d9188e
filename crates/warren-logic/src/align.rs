//! Connection alignment for template placement.

use crate::geometry::{floor_center_offset, Direction, Point, Rect};
use crate::region::WallThickness;

/// Position for a template so that its opening `template_connection`
/// (template-local, innermost wall row) lands on `existing`.
///
/// `side` is the wall of the already placed region that carries `existing`;
/// the template attaches with its `side.opposite()` wall. The returned point is
/// the world position of the template's inner-bounds minimum corner, ready for
/// [`RegionTemplate::instantiate`](crate::template::RegionTemplate::instantiate).
///
/// The one-cell `facing` correction applies on every side, since template
/// openings are authored on the innermost wall row whichever side they are on.
pub fn align(
    existing: &Rect,
    template_connection: &Rect,
    side: Direction,
    thickness: &WallThickness,
) -> Point {
    let facing = side.opposite();
    let translation = floor_center_offset(existing, template_connection)
        - thickness.vector(facing)
        + facing.unit();
    log::debug!(
        "align {} on {} wall with template opening {} -> {}",
        existing,
        side,
        template_connection,
        translation
    );
    translation
}
