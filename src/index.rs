use crate::*;
use rstar::{RTree, RTreeObject, AABB};

#[derive(Clone)]
struct Boxed<T> {
    env: AABB<Point2>,
    data: T,
}

impl<T> RTreeObject for Boxed<T> {
    type Envelope = AABB<Point2>;

    #[inline]
    fn envelope(&self) -> Self::Envelope {
        self.env
    }
}

/// A bulk loaded R-tree of items keyed on their plan extents.
#[derive(Clone)]
pub struct Index<T> {
    tree: RTree<Boxed<T>>,
}

impl<T> Index<T> {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = (Extents2, T)>,
    {
        let items = items
            .into_iter()
            .map(|(e, data)| Boxed {
                env: e.to_aabb(),
                data,
            })
            .collect();

        Self {
            tree: RTree::bulk_load(items),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Items with extents intersecting `e`, borders inclusive, in no particular order.
    pub fn query(&self, e: Extents2) -> impl Iterator<Item = &T> + '_ {
        self.tree
            .locate_in_envelope_intersecting(&e.to_aabb())
            .map(|b| &b.data)
    }
}

impl<T> Default for Index<T> {
    fn default() -> Self {
        Self {
            tree: RTree::new(),
        }
    }
}

impl<T> std::fmt::Debug for Index<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_queries() {
        let idx = Index::new([
            (Extents2::from_iter([[0.0, 0.0], [1.0, 1.0]]), 'a'),
            (Extents2::from_iter([[5.0, 5.0], [6.0, 6.0]]), 'b'),
            (Extents2::from_iter([[0.5, 0.5], [5.5, 5.5]]), 'c'),
        ]);
        assert_eq!(idx.len(), 3);

        let mut x = idx
            .query(Extents2::point([0.2, 0.2]))
            .copied()
            .collect::<Vec<_>>();
        x.sort();
        assert_eq!(x, vec!['a']);

        // touching borders count
        let mut x = idx
            .query(Extents2::point([1.0, 1.0]))
            .copied()
            .collect::<Vec<_>>();
        x.sort();
        assert_eq!(x, vec!['a', 'c']);

        assert_eq!(idx.query(Extents2::point([9.0, 9.0])).count(), 0);
        assert!(Index::<u8>::default().is_empty());
    }
}
