//! Fixed ASCII room layouts.
//!
//! `.` floor, `X` wall, `N`/`S`/`W`/`E` a door on that side, space is outside
//! the room. Doors sit on the bounding box edge with floor directly inside.

use crate::types::{Direction, Pos};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternCell {
    Outside,
    Floor,
    Wall,
    Door(Direction),
}

#[derive(Debug, PartialEq, Eq)]
pub struct RoomPattern {
    pub rows: &'static [&'static str],
    /// Extra coverage credit for sparse, lattice-like layouts.
    pub bonus: u64,
}

impl RoomPattern {
    pub fn width(&self) -> i32 {
        self.rows.iter().map(|row| row.len()).max().unwrap_or(0) as i32
    }

    pub fn height(&self) -> i32 {
        self.rows.len() as i32
    }

    /// Cell at pattern-local `(col, row)`.
    pub fn cell(&self, col: i32, row: i32) -> PatternCell {
        if col < 0 || row < 0 {
            return PatternCell::Outside;
        }
        let Some(line) = self.rows.get(row as usize) else {
            return PatternCell::Outside;
        };
        match line.as_bytes().get(col as usize) {
            Some(b'.') => PatternCell::Floor,
            Some(b'X') => PatternCell::Wall,
            Some(b'N') => PatternCell::Door(Direction::North),
            Some(b'S') => PatternCell::Door(Direction::South),
            Some(b'W') => PatternCell::Door(Direction::West),
            Some(b'E') => PatternCell::Door(Direction::East),
            _ => PatternCell::Outside,
        }
    }

    /// Pattern-local positions of every door with its facing.
    pub fn doors(&self) -> Vec<(Pos, Direction)> {
        let mut doors = Vec::new();
        for row in 0..self.height() {
            for col in 0..self.width() {
                if let PatternCell::Door(dir) = self.cell(col, row) {
                    doors.push((Pos::new(col, row), dir));
                }
            }
        }
        doors
    }

    pub fn doors_facing(&self, facing: Direction) -> Vec<Pos> {
        self.doors().into_iter().filter(|&(_, dir)| dir == facing).map(|(pos, _)| pos).collect()
    }

    pub fn cell_count(&self) -> u64 {
        self.rows
            .iter()
            .flat_map(|row| row.bytes())
            .filter(|&byte| byte != b' ')
            .count() as u64
    }
}

pub static TEMPLE: RoomPattern = RoomPattern {
    rows: &[
        "XXXXXXNXXXXXX",
        "X...........X",
        "X.X.X...X.X.X",
        "X...........X",
        "W..XXX.XXX..E",
        "X..X.....X..X",
        "X..X.....X..X",
        "X..XXXXXXX..X",
        "X...........X",
        "X...........X",
        "XXXXXXSXXXXXX",
    ],
    bonus: 16,
};

pub static CRYPT: RoomPattern = RoomPattern {
    rows: &[
        "XXXXXNXXXXX",
        "X.........X",
        "X.X.X.X.X.X",
        "X.........X",
        "W.........E",
        "X.........X",
        "X.X.X.X.X.X",
        "X.........X",
        "XXXXXSXXXXX",
    ],
    bonus: 0,
};

pub static STAR: RoomPattern = RoomPattern {
    rows: &[
        "     XNX     ",
        "     X.X     ",
        "  XXXX.XXXX  ",
        "  X.......X  ",
        "XXX.......XXX",
        "W...........E",
        "XXX.......XXX",
        "  X.......X  ",
        "  XXXX.XXXX  ",
        "     X.X     ",
        "     XSX     ",
    ],
    bonus: 0,
};

pub static SPIDER: RoomPattern = RoomPattern {
    rows: &[
        "XNXXXXXXXXXNX",
        "X.XXXXXXXXX.X",
        "X..XXXXXXX..X",
        "XX..XXXXX..XX",
        "XXX.......XXX",
        "W...........E",
        "XXX.......XXX",
        "XX..XXXXX..XX",
        "X..XXXXXXX..X",
        "X.XXXXXXXXX.X",
        "XSXXXXXXXXXSX",
    ],
    bonus: 12,
};

pub static WHEEL: RoomPattern = RoomPattern {
    rows: &[
        "XXXXXNXXXXX",
        "X.........X",
        "X.XXX.XXX.X",
        "X.X.....X.X",
        "X.X.XXX.X.X",
        "W...XXX...E",
        "X.X.XXX.X.X",
        "X.X.....X.X",
        "X.XXX.XXX.X",
        "X.........X",
        "XXXXXSXXXXX",
    ],
    bonus: 24,
};

pub static MONASTIC_CELLS: RoomPattern = RoomPattern {
    rows: &[
        "XXXXXNXXXXXXX",
        "X.X.X.X.X.X.X",
        "X.X.X.X.X.X.X",
        "W...........E",
        "X.X.X.X.X.X.X",
        "X.X.X.X.X.X.X",
        "XXXXXXXSXXXXX",
    ],
    bonus: 0,
};

pub static CROSS: RoomPattern = RoomPattern {
    rows: &[
        "    XNX    ",
        "    X.X    ",
        "    X.X    ",
        "XXXXX.XXXXX",
        "W.........E",
        "XXXXX.XXXXX",
        "    X.X    ",
        "    X.X    ",
        "    XSX    ",
    ],
    bonus: 0,
};

pub static COLONNADE: RoomPattern = RoomPattern {
    rows: &[
        "XXXXXXNXXXXXX",
        "X...........X",
        "X.X.X.X.X.X.X",
        "X...........X",
        "W...........E",
        "X...........X",
        "X.X.X.X.X.X.X",
        "X...........X",
        "XXXXXXSXXXXXX",
    ],
    bonus: 12,
};

pub static CHAPEL: RoomPattern = RoomPattern {
    rows: &[
        "XXXXXNXXXXX",
        "X.........X",
        "X.XX...XX.X",
        "X.........X",
        "X.X.....X.X",
        "W.X.....X.E",
        "X.X.....X.X",
        "X.........X",
        "X.XX.X.XX.X",
        "X.........X",
        "XXXXXSXXXXX",
    ],
    bonus: 0,
};

pub static OCTAGON: RoomPattern = RoomPattern {
    rows: &[
        "   XXNXX   ",
        "  XX...XX  ",
        " XX.....XX ",
        "XX.......XX",
        "X.........X",
        "W.........E",
        "X.........X",
        "XX.......XX",
        " XX.....XX ",
        "  XX...XX  ",
        "   XXSXX   ",
    ],
    bonus: 0,
};

pub static ALT_ROOM_A: RoomPattern = RoomPattern {
    rows: &[
        "XXXNXXXXXXX",
        "X.........X",
        "X.........X",
        "X....XXXXXX",
        "W....XXXXXX",
        "X....XXXXXX",
        "X.........E",
        "X.........X",
        "XXXXXXXSXXX",
    ],
    bonus: 0,
};

pub static ALT_ROOM_B: RoomPattern = RoomPattern {
    rows: &[
        "XXXNXXXXXXXNX",
        "X.....X.....X",
        "X.....X.....X",
        "W...........E",
        "X.....X.....X",
        "X.....X.....X",
        "XXSXXXXXXXSXX",
    ],
    bonus: 0,
};

pub static ALT_ROOM_C: RoomPattern = RoomPattern {
    rows: &[
        "XXXXNXXXX",
        "X.......X",
        "X.X...X.X",
        "X.......X",
        "W...X...E",
        "X.......X",
        "X.X...X.X",
        "X.......X",
        "XXXXSXXXX",
    ],
    bonus: 0,
};

pub static ALT_ROOM_D: RoomPattern = RoomPattern {
    rows: &[
        "XXXXXXXNXXXXXXX",
        "X.X.X.X.X.X.X.X",
        "X.............X",
        "W.............E",
        "X.............X",
        "X.X.X.X.X.X.X.X",
        "XXXXXXXSXXXXXXX",
    ],
    bonus: 0,
};

pub static ALL_PATTERNS: [&RoomPattern; 14] = [
    &TEMPLE,
    &CRYPT,
    &STAR,
    &SPIDER,
    &WHEEL,
    &MONASTIC_CELLS,
    &CROSS,
    &COLONNADE,
    &CHAPEL,
    &OCTAGON,
    &ALT_ROOM_A,
    &ALT_ROOM_B,
    &ALT_ROOM_C,
    &ALT_ROOM_D,
];
