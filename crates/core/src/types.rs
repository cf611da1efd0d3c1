use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct AreaId;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { y: self.y + dy, x: self.x + dx }
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        self.offset(dx, dy)
    }

    pub fn chebyshev(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    pub fn distance_squared(self, other: Pos) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        dx * dx + dy * dy
    }
}

/// Compass directions in clockwise order starting at north; `None` means "no heading".
///
/// Screen coordinates: north is `y - 1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    None,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const CARDINALS: [Direction; 4] =
        [Direction::North, Direction::East, Direction::South, Direction::West];

    pub const COMPASS: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Heading of a unit step; anything that is not a unit step is `None`.
    pub fn from_delta(dx: i32, dy: i32) -> Direction {
        Direction::COMPASS
            .into_iter()
            .find(|dir| dir.delta() == (dx, dy))
            .unwrap_or(Direction::None)
    }

    /// Position in [`Direction::COMPASS`], `None` for the null heading.
    pub fn index(self) -> Option<usize> {
        Direction::COMPASS.iter().position(|&dir| dir == self)
    }

    pub fn from_index(index: usize) -> Direction {
        Direction::COMPASS[index % 8]
    }

    pub fn opposite(self) -> Direction {
        match self.index() {
            Some(index) => Direction::from_index(index + 4),
            None => Direction::None,
        }
    }

    pub fn is_cardinal(self) -> bool {
        matches!(self, Direction::North | Direction::East | Direction::South | Direction::West)
    }

    /// True for north/south, where an area grows along the y axis.
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(self) -> i32 {
        self.left + self.width - 1
    }

    pub fn bottom(self) -> i32 {
        self.top + self.height - 1
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn square(self) -> u64 {
        if self.is_empty() { 0 } else { self.width as u64 * self.height as u64 }
    }

    pub fn center(self) -> Pos {
        Pos { y: self.top + self.height / 2, x: self.left + self.width / 2 }
    }

    pub fn contains(self, pos: Pos) -> bool {
        pos.x >= self.left && pos.x <= self.right() && pos.y >= self.top && pos.y <= self.bottom()
    }

    pub fn contains_rect(self, other: Rect) -> bool {
        !other.is_empty()
            && other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersection(self, other: Rect) -> Option<Rect> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if left > right || top > bottom {
            return None;
        }
        Some(Rect { left, top, width: right - left + 1, height: bottom - top + 1 })
    }

    pub fn positions(self) -> impl Iterator<Item = Pos> {
        (self.top..=self.bottom())
            .flat_map(move |y| (self.left..=self.right()).map(move |x| Pos { y, x }))
    }
}
