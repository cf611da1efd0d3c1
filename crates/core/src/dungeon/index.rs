//! Coarse bucket grid over accepted area bounds.
//!
//! Placement asks "which accepted areas could touch this box" thousands of
//! times per build; scanning every area makes large maps quadratic.

use std::collections::HashMap;

use crate::types::{AreaId, Pos, Rect};

const BUCKET_SIZE: i32 = 32;

#[derive(Debug, Default)]
pub(crate) struct AreaIndex {
    buckets: HashMap<(i32, i32), Vec<AreaId>>,
}

impl AreaIndex {
    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
    }

    pub(crate) fn insert(&mut self, id: AreaId, bounds: Rect) {
        for key in bucket_keys(bounds) {
            self.buckets.entry(key).or_default().push(id);
        }
    }

    /// Areas whose bounds share a bucket with `bounds`. May repeat ids.
    pub(crate) fn candidates(&self, bounds: Rect) -> impl Iterator<Item = AreaId> + '_ {
        bucket_keys(bounds)
            .filter_map(|key| self.buckets.get(&key))
            .flat_map(|ids| ids.iter().copied())
    }

    pub(crate) fn at(&self, pos: Pos) -> &[AreaId] {
        self.buckets.get(&bucket_of(pos)).map(Vec::as_slice).unwrap_or_default()
    }
}

fn bucket_of(pos: Pos) -> (i32, i32) {
    (pos.x.div_euclid(BUCKET_SIZE), pos.y.div_euclid(BUCKET_SIZE))
}

fn bucket_keys(bounds: Rect) -> impl Iterator<Item = (i32, i32)> {
    let (left, top) = bucket_of(Pos::new(bounds.left, bounds.top));
    let (right, bottom) = bucket_of(Pos::new(bounds.right(), bounds.bottom()));
    (top..=bottom).flat_map(move |y| (left..=right).map(move |x| (x, y)))
}
