//! Comparator-ordered collections
//!
//! [`SortedSet`] and [`SortedMap`] keep their contents sorted and
//! deduplicated under a [`Comparator`] chosen at the type level. The wire
//! form is the same as that of a `Vec`, which means that two collections with
//! the same members always encode to the same bytes, regardless of the order
//! in which those members were inserted.
//!
//! Decoding applies the same normalization, so a peer that sends entries out
//! of order (or repeated) yields the same value as one that does not.
//!
//! A comparator need not agree with `Ord` on the element type. The
//! transaction-error set, for instance, orders and deduplicates its entries by
//! transaction index alone:
//!
//! ```
//! use std::cmp::Ordering;
//! use ledger_model::seq::{Comparator, SortedSet};
//!
//! struct ByFirst;
//!
//! impl Comparator<(u8, &'static str)> for ByFirst {
//!     fn compare(a: &(u8, &'static str), b: &(u8, &'static str)) -> Ordering {
//!         a.0.cmp(&b.0)
//!     }
//! }
//!
//! let set: SortedSet<(u8, &str), ByFirst> = [(2, "b"), (1, "a"), (2, "c")].into_iter().collect();
//! assert_eq!(set.as_slice(), &[(1, "a"), (2, "b")]);
//! ```

use std::cmp::Ordering;
use std::fmt::Debug;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::conv::{target::Target, Decode, Encode};
use crate::parse::{ParseResult, Parser};

/// Total order used to sort and deduplicate the members of an ordered collection
pub trait Comparator<T: ?Sized> {
    fn compare(a: &T, b: &T) -> Ordering;
}

/// The comparator given by the `Ord` implementation of the element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparator<T> for NaturalOrder {
    #[inline]
    fn compare(a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Set of `T` kept sorted, without duplicates, under the comparator `C`
pub struct SortedSet<T, C = NaturalOrder> {
    items: Vec<T>,
    _order: PhantomData<fn() -> C>,
}

impl<T, C: Comparator<T>> SortedSet<T, C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _order: PhantomData,
        }
    }

    /// Builds a set from arbitrary values, sorting them under `C` and keeping
    /// the first of any run of equal values.
    pub fn from_vec(mut items: Vec<T>) -> Self {
        items.sort_by(C::compare);
        items.dedup_by(|later, earlier| C::compare(later, earlier) == Ordering::Equal);
        Self {
            items,
            _order: PhantomData,
        }
    }

    /// Inserts `value`, returning `false` (and leaving the set untouched) if an
    /// equal member is already present.
    pub fn insert(&mut self, value: T) -> bool {
        match self.items.binary_search_by(|probe| C::compare(probe, &value)) {
            Ok(_) => false,
            Err(ix) => {
                self.items.insert(ix, value);
                true
            }
        }
    }

    /// Removes and returns the member equal to `value`, if any.
    pub fn remove(&mut self, value: &T) -> Option<T> {
        match self.items.binary_search_by(|probe| C::compare(probe, value)) {
            Ok(ix) => Some(self.items.remove(ix)),
            Err(_) => None,
        }
    }

    pub fn contains(&self, value: &T) -> bool {
        self.get(value).is_some()
    }

    /// Returns the stored member equal to `value` under `C`.
    pub fn get(&self, value: &T) -> Option<&T> {
        self.items
            .binary_search_by(|probe| C::compare(probe, value))
            .ok()
            .map(|ix| &self.items[ix])
    }
}

impl<T, C> SortedSet<T, C> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T, C: Comparator<T>> Default for SortedSet<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, C> Clone for SortedSet<T, C> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            _order: PhantomData,
        }
    }
}

impl<T: Debug, C> Debug for SortedSet<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.items.iter()).finish()
    }
}

impl<T: PartialEq, C> PartialEq for SortedSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq, C> Eq for SortedSet<T, C> {}

impl<T: PartialOrd, C> PartialOrd for SortedSet<T, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.items.partial_cmp(&other.items)
    }
}

impl<T: Ord, C> Ord for SortedSet<T, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.items.cmp(&other.items)
    }
}

impl<T: Hash, C> Hash for SortedSet<T, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.items.hash(state)
    }
}

impl<T, C: Comparator<T>> FromIterator<T> for SortedSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<T, C: Comparator<T>> Extend<T> for SortedSet<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T, C> IntoIterator for SortedSet<T, C> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T, C> IntoIterator for &'a SortedSet<T, C> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Encode, C> Encode for SortedSet<T, C> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.items.write_to(buf)
    }
}

impl<T: Decode, C: Comparator<T>> Decode for SortedSet<T, C> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Vec::<T>::parse(p).map(Self::from_vec)
    }
}

/// Map from `K` to `V` whose entries are kept sorted by key under `C`
pub struct SortedMap<K, V, C = NaturalOrder> {
    entries: Vec<(K, V)>,
    _order: PhantomData<fn() -> C>,
}

impl<K, V, C: Comparator<K>> SortedMap<K, V, C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _order: PhantomData,
        }
    }

    /// Builds a map from arbitrary entries, sorting them by key under `C`.
    ///
    /// Of several entries with equal keys, the last one wins, as if each had
    /// been inserted in turn.
    pub fn from_vec(mut raw: Vec<(K, V)>) -> Self {
        raw.sort_by(|a, b| C::compare(&a.0, &b.0));
        let mut entries: Vec<(K, V)> = Vec::with_capacity(raw.len());
        for entry in raw {
            match entries.last_mut() {
                Some(last) if C::compare(&last.0, &entry.0) == Ordering::Equal => *last = entry,
                _ => entries.push(entry),
            }
        }
        Self {
            entries,
            _order: PhantomData,
        }
    }

    fn search(&self, key: &K) -> Result<usize, usize> {
        self.entries.binary_search_by(|(probe, _)| C::compare(probe, key))
    }

    /// Inserts an entry, returning the value previously held under `key`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.search(&key) {
            Ok(ix) => Some(std::mem::replace(&mut self.entries[ix].1, value)),
            Err(ix) => {
                self.entries.insert(ix, (key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        match self.search(key) {
            Ok(ix) => Some(self.entries.remove(ix).1),
            Err(_) => None,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.search(key).ok().map(|ix| &self.entries[ix].1)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        match self.search(key) {
            Ok(ix) => Some(&mut self.entries[ix].1),
            Err(_) => None,
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.search(key).is_ok()
    }
}

impl<K, V, C> SortedMap<K, V, C> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn into_vec(self) -> Vec<(K, V)> {
        self.entries
    }
}

impl<K, V, C: Comparator<K>> Default for SortedMap<K, V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone, C> Clone for SortedMap<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            _order: PhantomData,
        }
    }
}

impl<K: Debug, V: Debug, C> Debug for SortedMap<K, V, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for SortedMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq, V: Eq, C> Eq for SortedMap<K, V, C> {}

impl<K: PartialOrd, V: PartialOrd, C> PartialOrd for SortedMap<K, V, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.entries.partial_cmp(&other.entries)
    }
}

impl<K: Ord, V: Ord, C> Ord for SortedMap<K, V, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.entries.cmp(&other.entries)
    }
}

impl<K: Hash, V: Hash, C> Hash for SortedMap<K, V, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.hash(state)
    }
}

impl<K, V, C: Comparator<K>> FromIterator<(K, V)> for SortedMap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for SortedMap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, C> IntoIterator for SortedMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Encode, V: Encode, C> Encode for SortedMap<K, V, C> {
    fn write_to<U: Target>(&self, buf: &mut U) -> usize {
        self.entries.write_to(buf)
    }
}

impl<K: Decode, V: Decode, C: Comparator<K>> Decode for SortedMap<K, V, C> {
    fn parse<P: Parser>(p: &mut P) -> ParseResult<Self> {
        Vec::<(K, V)>::parse(p).map(Self::from_vec)
    }
}
