//! Area footprints and their pairwise intersection tests.
//!
//! A shape is a closed set of cell centres. Wall cells are footprint cells
//! with a 4-neighbour outside the footprint; the rest is floor. Intersection
//! tests compare the open interiors, so two areas may share wall cells (that
//! is how a child attaches to the mark on its parent's border) but never a
//! floor cell.

use crate::types::{Direction, Pos, Rect};

use super::patterns::{PatternCell, RoomPattern};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Circle {
    pub center: Pos,
    pub radius: i32,
}

impl Circle {
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            2 * self.radius + 1,
            2 * self.radius + 1,
        )
    }

    fn contains(&self, pos: Pos) -> bool {
        pos.distance_squared(self.center) <= i64::from(self.radius) * i64::from(self.radius)
    }

    /// Outermost cell in a cardinal direction.
    pub fn extreme(&self, dir: Direction) -> Pos {
        let (dx, dy) = dir.delta();
        self.center.offset(dx * self.radius, dy * self.radius)
    }
}

/// Signs of the quarter plane an annulus occupies, each `1` or `-1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quadrant {
    pub sx: i32,
    pub sy: i32,
}

/// Quarter of a ring: the cells between `inner` and `outer` in one quadrant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Annulus {
    pub center: Pos,
    pub inner: i32,
    pub outer: i32,
    pub quadrant: Quadrant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnnulusEnd {
    /// The end lying on the horizontal axis through the centre.
    Horizontal,
    /// The end lying on the vertical axis through the centre.
    Vertical,
}

impl Annulus {
    pub fn bounds(&self) -> Rect {
        let left = if self.quadrant.sx > 0 { self.center.x } else { self.center.x - self.outer };
        let top = if self.quadrant.sy > 0 { self.center.y } else { self.center.y - self.outer };
        Rect::new(left, top, self.outer + 1, self.outer + 1)
    }

    fn contains(&self, pos: Pos) -> bool {
        let dx = pos.x - self.center.x;
        let dy = pos.y - self.center.y;
        if dx * self.quadrant.sx < 0 || dy * self.quadrant.sy < 0 {
            return false;
        }
        let distance = pos.distance_squared(self.center);
        let inner = i64::from(self.inner);
        let outer = i64::from(self.outer);
        distance >= inner * inner && distance <= outer * outer
    }

    /// Direction pointing out of the corridor through the given end.
    pub fn facing(&self, end: AnnulusEnd) -> Direction {
        match end {
            AnnulusEnd::Horizontal => Direction::from_delta(0, -self.quadrant.sy),
            AnnulusEnd::Vertical => Direction::from_delta(-self.quadrant.sx, 0),
        }
    }

    /// Cell of an end at `offset` cells from the centre.
    pub fn end_cell(&self, end: AnnulusEnd, offset: i32) -> Pos {
        match end {
            AnnulusEnd::Horizontal => self.center.offset(self.quadrant.sx * offset, 0),
            AnnulusEnd::Vertical => self.center.offset(0, self.quadrant.sy * offset),
        }
    }

    /// Offsets along an end whose cell has floor directly inside.
    pub fn door_offsets(&self) -> (i32, i32) {
        (self.inner + 1, self.outer - 2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternPlacement {
    pub origin: Pos,
    pub pattern: &'static RoomPattern,
}

impl PatternPlacement {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.pattern.width(), self.pattern.height())
    }

    pub fn cell(&self, pos: Pos) -> PatternCell {
        self.pattern.cell(pos.x - self.origin.x, pos.y - self.origin.y)
    }

    /// World positions of the pattern's doors.
    pub fn doors(&self) -> Vec<(Pos, Direction)> {
        self.pattern
            .doors()
            .into_iter()
            .map(|(local, dir)| (local.offset(self.origin.x, self.origin.y), dir))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Rect(Rect),
    Circle(Circle),
    Annulus(Annulus),
    Pattern(PatternPlacement),
}

impl Shape {
    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rect(rect) => *rect,
            Shape::Circle(circle) => circle.bounds(),
            Shape::Annulus(annulus) => annulus.bounds(),
            Shape::Pattern(placement) => placement.bounds(),
        }
    }

    /// Closed footprint membership.
    pub fn contains(&self, pos: Pos) -> bool {
        match self {
            Shape::Rect(rect) => rect.contains(pos),
            Shape::Circle(circle) => circle.contains(pos),
            Shape::Annulus(annulus) => annulus.contains(pos),
            Shape::Pattern(placement) => placement.cell(pos) != PatternCell::Outside,
        }
    }

    pub fn is_wall_point(&self, pos: Pos) -> bool {
        match self {
            Shape::Pattern(placement) => {
                matches!(placement.cell(pos), PatternCell::Wall | PatternCell::Door(_))
            }
            _ => {
                self.contains(pos)
                    && Direction::CARDINALS.iter().any(|&dir| !self.contains(pos.step(dir)))
            }
        }
    }

    pub fn is_floor_point(&self, pos: Pos) -> bool {
        match self {
            Shape::Pattern(placement) => placement.cell(pos) == PatternCell::Floor,
            _ => self.contains(pos) && !self.is_wall_point(pos),
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = Pos> + '_ {
        self.bounds().positions().filter(move |&pos| self.contains(pos))
    }

    /// A doorway needs a wall cell with floor directly behind it.
    pub fn accepts_door(&self, pos: Pos, inward: Direction) -> bool {
        self.is_wall_point(pos) && self.is_floor_point(pos.step(inward))
    }

    fn primitive(&self) -> Primitive {
        match self {
            Shape::Rect(rect) => Primitive::Rect(*rect),
            Shape::Circle(circle) => Primitive::Circle(*circle),
            Shape::Annulus(annulus) => Primitive::Annulus(*annulus),
            Shape::Pattern(placement) => Primitive::Rect(placement.bounds()),
        }
    }
}

/// Geometry used for intersection: pattern rooms collapse to their bounding box.
#[derive(Clone, Copy)]
enum Primitive {
    Rect(Rect),
    Circle(Circle),
    Annulus(Annulus),
}

/// Whether the interiors of two shapes overlap.
///
/// Each unordered pair of primitives has exactly one test; mirrored pairs swap
/// their arguments into it, so the result is symmetric by construction.
pub fn intersects(a: &Shape, b: &Shape) -> bool {
    use Primitive as P;
    match (a.primitive(), b.primitive()) {
        (P::Rect(a), P::Rect(b)) => rect_rect(a, b),
        (P::Circle(a), P::Circle(b)) => circle_circle(a, b),
        (P::Annulus(a), P::Annulus(b)) => annulus_annulus(a, b),
        (P::Circle(c), P::Rect(r)) | (P::Rect(r), P::Circle(c)) => circle_rect(c, r),
        (P::Annulus(a), P::Rect(r)) | (P::Rect(r), P::Annulus(a)) => annulus_rect(a, r),
        (P::Annulus(a), P::Circle(c)) | (P::Circle(c), P::Annulus(a)) => annulus_circle(a, c),
    }
}

fn rect_rect(a: Rect, b: Rect) -> bool {
    a.left < b.right() && b.left < a.right() && a.top < b.bottom() && b.top < a.bottom()
}

fn circle_circle(a: Circle, b: Circle) -> bool {
    let reach = i64::from(a.radius + b.radius);
    a.center.distance_squared(b.center) < reach * reach
}

fn circle_rect(circle: Circle, rect: Rect) -> bool {
    let nearest = Pos {
        y: circle.center.y.clamp(rect.top, rect.bottom()),
        x: circle.center.x.clamp(rect.left, rect.right()),
    };
    let radius = i64::from(circle.radius);
    nearest.distance_squared(circle.center) < radius * radius
}

fn annulus_rect(annulus: Annulus, rect: Rect) -> bool {
    let quarter = annulus.bounds();
    let x0 = rect.left.max(quarter.left);
    let x1 = rect.right().min(quarter.right());
    let y0 = rect.top.max(quarter.top);
    let y1 = rect.bottom().min(quarter.bottom());
    if x0 >= x1 || y0 >= y1 {
        return false;
    }
    let (near_x, far_x) = axis_extent(x0 - annulus.center.x, x1 - annulus.center.x);
    let (near_y, far_y) = axis_extent(y0 - annulus.center.y, y1 - annulus.center.y);
    let nearest = near_x * near_x + near_y * near_y;
    let farthest = far_x * far_x + far_y * far_y;
    let inner = i64::from(annulus.inner);
    let outer = i64::from(annulus.outer);
    nearest < outer * outer && farthest > inner * inner
}

/// Smallest and largest absolute offset over `from..=to`, which never straddles zero here.
fn axis_extent(from: i32, to: i32) -> (i64, i64) {
    let a = i64::from(from.abs());
    let b = i64::from(to.abs());
    (a.min(b), a.max(b))
}

fn annulus_circle(annulus: Annulus, circle: Circle) -> bool {
    if !rect_rect(annulus.bounds(), circle.bounds()) {
        return false;
    }
    let distance = (annulus.center.distance_squared(circle.center) as f64).sqrt();
    let radius = f64::from(circle.radius);
    distance < f64::from(annulus.outer) + radius && distance + radius > f64::from(annulus.inner)
}

fn annulus_annulus(a: Annulus, b: Annulus) -> bool {
    if !rect_rect(a.bounds(), b.bounds()) {
        return false;
    }
    let distance = (a.center.distance_squared(b.center) as f64).sqrt();
    distance < f64::from(a.outer + b.outer)
        && distance + f64::from(b.outer) > f64::from(a.inner)
        && distance + f64::from(a.outer) > f64::from(b.inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::patterns::CROSS;

    fn ring(center: Pos, inner: i32, outer: i32, sx: i32, sy: i32) -> Shape {
        Shape::Annulus(Annulus { center, inner, outer, quadrant: Quadrant { sx, sy } })
    }

    fn samples() -> Vec<Shape> {
        vec![
            Shape::Rect(Rect::new(0, 0, 6, 5)),
            Shape::Rect(Rect::new(5, 0, 4, 5)),
            Shape::Rect(Rect::new(3, 3, 5, 5)),
            Shape::Circle(Circle { center: Pos::new(10, 2), radius: 3 }),
            Shape::Circle(Circle { center: Pos::new(4, 9), radius: 4 }),
            ring(Pos::new(0, 12), 3, 6, 1, -1),
            ring(Pos::new(12, 12), 2, 5, -1, 1),
            Shape::Pattern(PatternPlacement { origin: Pos::new(6, 6), pattern: &CROSS }),
        ]
    }

    #[test]
    fn intersection_is_symmetric_for_every_pair() {
        let shapes = samples();
        for a in &shapes {
            for b in &shapes {
                assert_eq!(intersects(a, b), intersects(b, a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn rooms_sharing_a_wall_do_not_intersect() {
        let left = Shape::Rect(Rect::new(0, 0, 6, 5));
        let right = Shape::Rect(Rect::new(5, 1, 4, 3));
        assert!(!intersects(&left, &right));
        let overlapping = Shape::Rect(Rect::new(4, 1, 4, 3));
        assert!(intersects(&left, &overlapping));
    }

    #[test]
    fn circle_touching_a_rect_edge_does_not_intersect() {
        let rect = Shape::Rect(Rect::new(0, 10, 8, 5));
        let touching = Shape::Circle(Circle { center: Pos::new(4, 6), radius: 4 });
        let sinking = Shape::Circle(Circle { center: Pos::new(4, 7), radius: 4 });
        assert!(!intersects(&rect, &touching));
        assert!(intersects(&rect, &sinking));
    }

    #[test]
    fn annulus_ignores_rects_inside_its_hole_or_other_quadrants() {
        let annulus = ring(Pos::new(0, 0), 5, 8, 1, -1);
        let in_hole = Shape::Rect(Rect::new(0, -3, 3, 3));
        let other_quadrant = Shape::Rect(Rect::new(-6, -6, 5, 5));
        let on_ring = Shape::Rect(Rect::new(4, -7, 3, 3));
        assert!(!intersects(&annulus, &in_hole));
        assert!(!intersects(&annulus, &other_quadrant));
        assert!(intersects(&annulus, &on_ring));
    }

    #[test]
    fn intersecting_shapes_may_only_share_wall_cells() {
        let shapes = samples();
        for a in &shapes {
            for b in &shapes {
                if a == b || intersects(a, b) {
                    continue;
                }
                for cell in a.cells() {
                    assert!(
                        !(b.contains(cell) && (a.is_floor_point(cell) || b.is_floor_point(cell))),
                        "{a:?} and {b:?} share floor at {cell:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn annulus_door_offsets_have_floor_behind_both_ends() {
        let annulus = Annulus {
            center: Pos::new(20, 20),
            inner: 4,
            outer: 7,
            quadrant: Quadrant { sx: -1, sy: 1 },
        };
        let shape = Shape::Annulus(annulus);
        let (low, high) = annulus.door_offsets();
        for end in [AnnulusEnd::Horizontal, AnnulusEnd::Vertical] {
            for offset in low..=high {
                let door = annulus.end_cell(end, offset);
                let inward = annulus.facing(end).opposite();
                assert!(shape.accepts_door(door, inward), "{end:?} {offset}");
            }
        }
    }
}
