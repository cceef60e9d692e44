use std::borrow::Borrow;
use std::marker::PhantomData;

use derive_more::{Display, From, Into};

pub trait Index: Clone + Copy + From<usize> + Into<usize> {}

/// Handle of a vertex in the host mesh.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Debug, From, Into, Display)]
#[display(fmt = "vtx[{}]", _0)]
pub struct VertexId(pub usize);

/// Handle of an undirected edge in the host mesh.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Debug, From, Into, Display)]
#[display(fmt = "e[{}]", _0)]
pub struct EdgeId(pub usize);

/// Handle of a polygon in the host mesh.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Debug, From, Into, Display)]
#[display(fmt = "f[{}]", _0)]
pub struct FaceId(pub usize);

impl Index for VertexId {}
impl Index for EdgeId {}
impl Index for FaceId {}

fn slot<I: Index, K: Borrow<I>>(index: K) -> usize {
    (*index.borrow()).into()
}

/// Dense storage addressed by a typed handle. Handles are handed out in
/// insertion order and stay valid for the lifetime of the store.
#[derive(Clone, Debug)]
pub struct IdVec<I: Index, T> {
    items: Vec<T>,
    marker: PhantomData<fn() -> I>,
}

impl<I: Index, T> Default for IdVec<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Index, T> IdVec<I, T> {
    pub fn new() -> Self {
        Self {
            items: vec![],
            marker: PhantomData,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            marker: PhantomData,
        }
    }

    pub fn push(&mut self, item: T) -> I {
        let idx = I::from(self.items.len());
        self.items.push(item);
        idx
    }

    pub fn contains<K: Borrow<I>>(&self, index: K) -> bool {
        slot::<I, K>(index) < self.items.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = I> + '_ {
        (0..self.items.len()).map(I::from)
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items.iter().enumerate().map(|(i, t)| (I::from(i), t))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<I: Index, T> FromIterator<T> for IdVec<I, T> {
    fn from_iter<It: IntoIterator<Item = T>>(iter: It) -> Self {
        Self {
            items: iter.into_iter().collect(),
            marker: PhantomData,
        }
    }
}

impl<K: Borrow<I>, I: Index, T> std::ops::Index<K> for IdVec<I, T> {
    type Output = T;

    fn index(&self, index: K) -> &Self::Output {
        &self.items[slot::<I, K>(index)]
    }
}

impl<K: Borrow<I>, I: Index, T> std::ops::IndexMut<K> for IdVec<I, T> {
    fn index_mut(&mut self, index: K) -> &mut Self::Output {
        &mut self.items[slot::<I, K>(index)]
    }
}
