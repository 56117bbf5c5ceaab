//! Edge Table and Active Edge Table.
//!
//! The [`EdgeTable`] buckets a polygon's edges by the first scanline they
//! cover. During the sweep each bucket moves into the [`ActiveEdgeTable`],
//! which holds the edges crossing the current scanline ordered by column so
//! consecutive entries pair up into spans.
//!
//! ```text
//!   ET                         AET at y = 60
//!   50: [e(x=150,-1), e(x=150,+1)]    (140, e-1) (160, e+1)
//!   70: [e(x=180,-2)]                  └── span 140..=160 ──┘
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::edge::Edge;
use super::RasterError;
use crate::math::{compare, FLOAT_TOL};

/// Orders edges by `(x_min, inv_slope)` with the float tolerance.
fn edge_order(a: &Edge, b: &Edge) -> Ordering {
    compare(a.x_min, b.x_min, FLOAT_TOL).then_with(|| compare(a.inv_slope, b.inv_slope, FLOAT_TOL))
}

/// Pending edges keyed by the first scanline they cover.
///
/// Each bucket stays sorted by `(x_min, inv_slope)`; edges that compare
/// equal keep their insertion order.
#[derive(Debug, Default)]
pub struct EdgeTable {
    buckets: BTreeMap<i32, Vec<Edge>>,
    len: usize,
}

impl EdgeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, scanline: i32, edge: Edge) {
        let bucket = self.buckets.entry(scanline).or_default();
        let at = bucket.partition_point(|e| edge_order(e, &edge) != Ordering::Greater);
        bucket.insert(at, edge);
        self.len += 1;
    }

    /// Removes and returns the bucket for `scanline`.
    pub fn take(&mut self, scanline: i32) -> Option<Vec<Edge>> {
        let bucket = self.buckets.remove(&scanline)?;
        self.len -= bucket.len();
        Some(bucket)
    }

    /// Removes every bucket keyed below `scanline`, in scanline order.
    pub fn take_before(&mut self, scanline: i32) -> Vec<(i32, Vec<Edge>)> {
        let rest = self.buckets.split_off(&scanline);
        let before = std::mem::replace(&mut self.buckets, rest);
        let taken: Vec<_> = before.into_iter().collect();
        self.len -= taken.iter().map(|(_, b)| b.len()).sum::<usize>();
        taken
    }

    /// Smallest scanline with pending edges.
    pub fn first_scanline(&self) -> Option<i32> {
        self.buckets.keys().next().copied()
    }

    pub fn bucket(&self, scanline: i32) -> &[Edge] {
        self.buckets.get(&scanline).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Edges crossing the current scanline, keyed by rounded column.
///
/// Behaves as a multimap: entries with the same column keep the order in
/// which they were inserted.
#[derive(Debug, Default)]
pub struct ActiveEdgeTable {
    entries: Vec<(i32, Edge)>,
}

impl ActiveEdgeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, edge: Edge) {
        let key = edge.column();
        let at = self.entries.partition_point(|(k, _)| *k <= key);
        self.entries.insert(at, (key, edge));
    }

    pub fn extend(&mut self, edges: impl IntoIterator<Item = Edge>) {
        for edge in edges {
            self.insert(edge);
        }
    }

    /// Left/right pairs of the current scanline, in column order.
    ///
    /// An odd number of active edges cannot be paired and is reported for
    /// `scanline`.
    pub fn pairs(&self, scanline: i32) -> Result<std::slice::ChunksExact<'_, (i32, Edge)>, RasterError> {
        if self.entries.len() % 2 != 0 {
            return Err(RasterError::UnpairedEdges {
                scanline,
                count: self.entries.len(),
            });
        }
        Ok(self.entries.chunks_exact(2))
    }

    /// Drops edges that end on `scanline`, steps the rest to the next
    /// scanline and re-sorts them by their new column.
    pub fn advance(&mut self, scanline: i32) {
        self.entries.retain(|(_, e)| e.last_scanline() > scanline);
        for (key, edge) in &mut self.entries {
            edge.step();
            *key = edge.column();
        }
        // Stable, so crossing-free ties keep their order.
        self.entries.sort_by_key(|(key, _)| *key);
    }

    /// Columns of the active edges, in table order.
    pub fn columns(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::super::ScreenVertex;
    use super::*;
    use crate::math::vec3::Vec3;

    fn edge(x0: f32, y0: f32, x1: f32, y1: f32) -> (i32, Edge) {
        let a = ScreenVertex::new(Vec3::new(x0, y0, 0.0), Vec3::ZERO, Vec3::ZERO);
        let b = ScreenVertex::new(Vec3::new(x1, y1, 0.0), Vec3::ZERO, Vec3::ZERO);
        Edge::between(&a, &b, false).unwrap()
    }

    #[test]
    fn bucket_is_sorted_by_x_then_slope() {
        let mut et = EdgeTable::new();
        for (x1, y1) in [(40.0, 20.0), (5.0, 20.0), (0.0, 20.0), (20.0, 20.0), (-30.0, 20.0)] {
            let (y, e) = edge(10.0, 0.0, x1, y1);
            et.insert(y, e);
        }
        let (y, e) = edge(2.0, 0.0, 2.0, 9.0);
        et.insert(y, e);

        let bucket = et.bucket(0);
        assert_eq!(bucket.len(), 6);
        for pair in bucket.windows(2) {
            assert_ne!(edge_order(&pair[0], &pair[1]), Ordering::Greater);
        }
        assert_eq!(bucket[0].x_min, 2.0);
        assert!(bucket[1].inv_slope < bucket[2].inv_slope);
    }

    #[test]
    fn take_empties_table() {
        let mut et = EdgeTable::new();
        let (y0, e0) = edge(0.0, 3.0, 5.0, 9.0);
        let (y1, e1) = edge(0.0, 7.0, 5.0, 9.0);
        et.insert(y0, e0);
        et.insert(y1, e1);
        assert_eq!(et.first_scanline(), Some(3));
        assert_eq!(et.take(3).map(|b| b.len()), Some(1));
        assert_eq!(et.len(), 1);
        assert!(et.take(3).is_none());
        assert_eq!(et.take(7).map(|b| b.len()), Some(1));
        assert!(et.is_empty());
    }

    #[test]
    fn take_before_splits_at_scanline() {
        let mut et = EdgeTable::new();
        for y0 in [-8.0, -2.0, 0.0, 4.0] {
            let (y, e) = edge(0.0, y0, 1.0, 10.0);
            et.insert(y, e);
        }
        let before = et.take_before(0);
        assert_eq!(before.iter().map(|(y, _)| *y).collect::<Vec<_>>(), vec![-8, -2]);
        assert_eq!(et.len(), 2);
        assert_eq!(et.first_scanline(), Some(0));
    }

    #[test]
    fn aet_keeps_insertion_order_for_equal_columns() {
        let mut aet = ActiveEdgeTable::new();
        let (_, left) = edge(150.0, 50.0, 100.0, 100.0);
        let (_, right) = edge(150.0, 50.0, 200.0, 100.0);
        aet.insert(left);
        aet.insert(right);
        let pairs: Vec<_> = aet.pairs(50).unwrap().collect();
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0][0].1.inv_slope < 0.0);
    }

    #[test]
    fn advance_resorts_and_expires() {
        let mut aet = ActiveEdgeTable::new();
        let (_, short) = edge(0.0, 0.0, 0.0, 2.0);
        let (_, long) = edge(10.0, 0.0, -10.0, 10.0);
        aet.extend([short, long]);
        assert_eq!(aet.columns().collect::<Vec<_>>(), vec![0, 10]);

        aet.advance(0);
        assert_eq!(aet.columns().collect::<Vec<_>>(), vec![0, 8]);
        aet.advance(1);
        assert_eq!(aet.columns().collect::<Vec<_>>(), vec![6]);
    }

    #[test]
    fn odd_edge_count_is_reported() {
        let mut aet = ActiveEdgeTable::new();
        for x in [0.0, 5.0, 9.0] {
            let (_, e) = edge(x, 0.0, x, 4.0);
            aet.insert(e);
        }
        let err = aet.pairs(0).unwrap_err();
        assert_eq!(err, RasterError::UnpairedEdges { scanline: 0, count: 3 });
    }
}
