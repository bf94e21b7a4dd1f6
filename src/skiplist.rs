use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::iter::FusedIterator;
use std::mem;
use std::ops::{Bound, RangeBounds};
use tracing::{debug, trace};

use crate::config::SkipListOptions;
use crate::error::SkipListError;
use crate::level_generator::{GeometricLevelGenerator, LevelGenerator};

/// Arena index of the head node. The head is allocated on construction and never moves.
const HEAD: usize = 0;

/// One rung of a node's tower.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Level {
    /// Arena index of the next node at this level.
    forward: Option<usize>,
    /// Number of level 0 steps taken by following `forward`. When there is no `forward`, this is
    /// the number of elements after the node.
    span: usize,
}

#[derive(Debug)]
struct SkipNode<K, V> {
    /// The key should only be `None` for the `head` node.
    key: Option<K>,
    /// The value should only be `None` for the `head` node.
    value: Option<V>,
    levels: Vec<Level>,
}

impl<K, V> SkipNode<K, V> {
    fn new(key: K, value: V, height: usize) -> Self {
        SkipNode {
            key: Some(key),
            value: Some(value),
            levels: vec![Level::default(); height],
        }
    }

    fn head(max_level: usize) -> Self {
        SkipNode {
            key: None,
            value: None,
            levels: vec![Level::default(); max_level],
        }
    }

    /// Arena index of the next node at level 0.
    fn next(&self) -> Option<usize> {
        self.levels.first().and_then(|level| level.forward)
    }

    /// Compare this node's key with `target`. The head sorts before every key.
    fn cmp_key<Q>(&self, target: &Q) -> Ordering
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.key.as_ref() {
            Some(key) => key.borrow().cmp(target),
            None => Ordering::Less,
        }
    }

    fn entry(&self) -> (&K, &V) {
        match (self.key.as_ref(), self.value.as_ref()) {
            (Some(key), Some(value)) => (key, value),
            _ => unreachable!("the head node does not hold an entry"),
        }
    }
}

/// Where a descent stops on each level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stop {
    /// Stop on the last node whose key is strictly less than the target.
    Before,
    /// Stop on the last node whose key is less than or equal to the target.
    AtOrBefore,
}

impl Stop {
    fn advances(self, ordering: Ordering) -> bool {
        match self {
            Stop::Before => ordering == Ordering::Less,
            Stop::AtOrBefore => ordering != Ordering::Greater,
        }
    }
}

/// Per-call buffers used by mutations, sized to the maximum level.
#[derive(Debug, Default)]
struct Scratch {
    /// The last node visited on each level before dropping down.
    update: Vec<usize>,
    /// Level 0 distance from the head to `update[i]`.
    rank: Vec<usize>,
}

impl Scratch {
    fn new(max_level: usize) -> Self {
        Scratch {
            update: vec![HEAD; max_level],
            rank: vec![0; max_level],
        }
    }
}

/// A read-only handle to an entry stored in a [`SkipList`].
pub struct NodeRef<'a, K, V> {
    key: &'a K,
    value: &'a V,
}

impl<'a, K, V> NodeRef<'a, K, V> {
    pub fn key(&self) -> &'a K {
        self.key
    }

    pub fn value(&self) -> &'a V {
        self.value
    }

    /// Split the handle into its key and value references.
    pub fn into_pair(self) -> (&'a K, &'a V) {
        (self.key, self.value)
    }
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<K: Debug, V: Debug> Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", self.key)
            .field("value", self.value)
            .finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for NodeRef<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.value == other.value
    }
}

/// An ordered map backed by a skip list with rank tracking.
///
/// Every link records how many elements it skips, so the list can also answer positional queries
/// like [`rank`] and [`get_by_rank`] in expected logarithmic time.
///
/// # Concurrency
///
/// The list has no internal synchronization. Mutations take `&mut self`, so sharing across threads
/// requires an external lock.
///
/// [`rank`]: SkipList::rank
/// [`get_by_rank`]: SkipList::get_by_rank
pub struct SkipList<K, V, G = GeometricLevelGenerator> {
    /// Node arena. Index 0 is the head node and every other slot holds a live node.
    nodes: Vec<SkipNode<K, V>>,
    /// The last node in level 0 order.
    tail: Option<usize>,
    /// The number of elements in the skip list.
    length: usize,
    /// The number of levels currently in use. Always within `[1, max_level]`.
    level: usize,
    max_level: usize,
    level_generator: G,
    scratch: Scratch,
}

impl<K: Ord, V> SkipList<K, V> {
    /// Create a new skip list with a maximum of 100 levels and a promotion probability of 0.25.
    ///
    /// # Examples
    /// ```
    /// use skipjack::SkipList;
    ///
    /// let skiplist = SkipList::<String, i32>::new();
    /// assert!(skiplist.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::from_generator(GeometricLevelGenerator::default())
    }

    /// Create a new skip list from `options`.
    ///
    /// Returns an error if the maximum level is zero or the probability is not in `(0, 1)`.
    pub fn with_options(options: SkipListOptions) -> Result<Self, SkipListError> {
        let generator = match options.seed {
            Some(seed) => {
                GeometricLevelGenerator::with_seed(options.max_level, options.probability, seed)?
            }
            None => GeometricLevelGenerator::new(options.max_level, options.probability)?,
        };

        Ok(Self::from_generator(generator))
    }
}

impl<K, V, G> SkipList<K, V, G> {
    /// The number of elements in the skip list.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Returns true if the skip list does not hold any elements; otherwise false.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The number of levels currently in use.
    pub fn height(&self) -> usize {
        self.level
    }

    /// The tallest tower this skip list allows.
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Return the entry with the smallest key, if any.
    pub fn first(&self) -> Option<NodeRef<'_, K, V>> {
        self.nodes[HEAD].next().map(|idx| self.node_ref(idx))
    }

    /// Return the entry with the largest key, if any.
    pub fn last(&self) -> Option<NodeRef<'_, K, V>> {
        self.tail.map(|idx| self.node_ref(idx))
    }

    /// Return the entry at the 0-based position `rank` in key order.
    pub fn get_by_rank(&self, rank: usize) -> Option<NodeRef<'_, K, V>> {
        if rank >= self.length {
            return None;
        }

        let target = rank + 1;
        let mut current = HEAD;
        let mut traversed = 0;
        for level_idx in (0..self.level).rev() {
            while let Some(next) = self.nodes[current].levels[level_idx].forward {
                let span = self.nodes[current].levels[level_idx].span;
                if traversed + span > target {
                    break;
                }

                traversed += span;
                current = next;
            }

            if traversed == target {
                return Some(self.node_ref(current));
            }
        }

        None
    }

    /// An iterator visiting each entry in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            next: self.nodes[HEAD].next(),
            remaining: self.length,
        }
    }

    /// An iterator visiting each key in ascending order.
    ///
    /// Every call starts over from the smallest key.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// An iterator visiting each value in ascending key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Remove every element. The configured level generator is kept.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[HEAD]
            .levels
            .iter_mut()
            .for_each(|level| *level = Level::default());
        self.tail = None;
        self.length = 0;
        self.level = 1;
    }

    fn node_ref(&self, idx: usize) -> NodeRef<'_, K, V> {
        let (key, value) = self.nodes[idx].entry();
        NodeRef { key, value }
    }
}

impl<K: Ord, V, G: LevelGenerator> SkipList<K, V, G> {
    /// Create a new skip list that draws tower heights from `generator`.
    ///
    /// # Examples
    /// ```
    /// use skipjack::{GeometricLevelGenerator, SkipList};
    ///
    /// let generator = GeometricLevelGenerator::with_seed(32, 0.5, 7).unwrap();
    /// let mut skiplist = SkipList::with_level_generator(generator).unwrap();
    /// skiplist.set("banana", 2);
    /// skiplist.set("apple", 1);
    ///
    /// assert_eq!(skiplist.keys().collect::<Vec<_>>(), [&"apple", &"banana"]);
    /// ```
    pub fn with_level_generator(generator: G) -> Result<Self, SkipListError> {
        if generator.max_level() == 0 {
            return Err(SkipListError::InvalidMaxLevel(0));
        }

        Ok(Self::from_generator(generator))
    }

    fn from_generator(generator: G) -> Self {
        let max_level = generator.max_level();
        debug!(max_level, "creating skip list");

        SkipList {
            nodes: vec![SkipNode::head(max_level)],
            tail: None,
            length: 0,
            level: 1,
            max_level,
            level_generator: generator,
            scratch: Scratch::new(max_level),
        }
    }

    /// Get a handle to the entry with the specified `key`.
    ///
    /// Returns `None` if the key is not present.
    ///
    /// # Examples
    /// ```
    /// use skipjack::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// skiplist.set("ec".to_string(), 1);
    ///
    /// assert_eq!(skiplist.get("ec").map(|node| *node.value()), Some(1));
    /// assert!(skiplist.get("dc").is_none());
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<NodeRef<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).map(|idx| self.node_ref(idx))
    }

    /// Get a mutable reference to the value with the specified `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let idx = self.find(key)?;
        self.nodes[idx].value.as_mut()
    }

    /// Returns true if the skip list holds an element with the specified `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Return the 0-based position of `key` in key order.
    pub fn rank<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (idx, traversed) = self.seek(key, Stop::AtOrBefore);
        if idx != HEAD && self.nodes[idx].cmp_key(key) == Ordering::Equal {
            return Some(traversed - 1);
        }

        None
    }

    /// Return the first entry with a key that is greater than or equal to the target key.
    pub fn find_greater_or_equal<Q>(&self, target: &Q) -> Option<NodeRef<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (idx, _) = self.seek(target, Stop::Before);
        self.nodes[idx].next().map(|next| self.node_ref(next))
    }

    /// Return the last entry with a key that is less than the target key.
    pub fn find_less_than<Q>(&self, target: &Q) -> Option<NodeRef<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.seek(target, Stop::Before) {
            (HEAD, _) => None,
            (idx, _) => Some(self.node_ref(idx)),
        }
    }

    /// An iterator over the entries whose keys fall within `range`, in ascending key order.
    ///
    /// An empty or inverted range yields nothing.
    ///
    /// # Examples
    /// ```
    /// use skipjack::SkipList;
    ///
    /// let skiplist: SkipList<i32, &str> =
    ///     [(1, "apple"), (2, "banana"), (3, "orange"), (4, "strawberry")]
    ///         .into_iter()
    ///         .collect();
    ///
    /// let fruits: Vec<_> = skiplist.range(2..4).map(|(_, fruit)| *fruit).collect();
    /// assert_eq!(fruits, ["banana", "orange"]);
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Iter<'_, K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        R: RangeBounds<Q>,
    {
        let (before_start, start_rank) = match range.start_bound() {
            Bound::Included(key) => self.seek(key, Stop::Before),
            Bound::Excluded(key) => self.seek(key, Stop::AtOrBefore),
            Bound::Unbounded => (HEAD, 0),
        };
        let end_rank = match range.end_bound() {
            Bound::Included(key) => self.seek(key, Stop::AtOrBefore).1,
            Bound::Excluded(key) => self.seek(key, Stop::Before).1,
            Bound::Unbounded => self.length,
        };

        let remaining = end_rank.saturating_sub(start_rank);
        Iter {
            nodes: &self.nodes,
            next: self.nodes[before_start].next().filter(|_| remaining > 0),
            remaining,
        }
    }

    /// Insert a key-value pair, or overwrite the value if the key is already present.
    ///
    /// Returns a handle to the entry holding `value`.
    ///
    /// # Examples
    /// ```
    /// use skipjack::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// assert_eq!(*skiplist.set("foo", 1).value(), 1);
    /// assert_eq!(*skiplist.set("foo", 2).value(), 2);
    /// assert_eq!(skiplist.len(), 1);
    /// ```
    pub fn set(&mut self, key: K, value: V) -> NodeRef<'_, K, V> {
        let mut scratch = mem::take(&mut self.scratch);
        self.locate(&key, &mut scratch);

        if let Some(existing) = self.nodes[scratch.update[0]].next() {
            if self.nodes[existing].cmp_key(&key) == Ordering::Equal {
                self.nodes[existing].value = Some(value);
                self.scratch = scratch;
                return self.node_ref(existing);
            }
        }

        let height = self
            .level_generator
            .random_level()
            .clamp(1, self.max_level);
        if height > self.level {
            trace!(from = self.level, to = height, "raising skip list height");
            for level_idx in self.level..height {
                scratch.rank[level_idx] = 0;
                scratch.update[level_idx] = HEAD;
                self.nodes[HEAD].levels[level_idx].span = self.length;
            }
            self.level = height;
        }

        let new_idx = self.nodes.len();
        self.nodes.push(SkipNode::new(key, value, height));

        for level_idx in 0..height {
            let prev_idx = scratch.update[level_idx];
            let prev = self.nodes[prev_idx].levels[level_idx];
            // Distance from `prev_idx` to the node right before the insertion point.
            let skipped = scratch.rank[0] - scratch.rank[level_idx];

            self.nodes[new_idx].levels[level_idx] = Level {
                forward: prev.forward,
                span: prev.span - skipped,
            };
            self.nodes[prev_idx].levels[level_idx] = Level {
                forward: Some(new_idx),
                span: skipped + 1,
            };
        }

        // Levels above the new tower now skip over one more element.
        for level_idx in height..self.level {
            self.nodes[scratch.update[level_idx]].levels[level_idx].span += 1;
        }

        if self.nodes[new_idx].next().is_none() {
            self.tail = Some(new_idx);
        }

        self.length += 1;
        self.scratch = scratch;
        self.node_ref(new_idx)
    }

    /// Overwrite the value stored under `key`.
    ///
    /// Returns the previous value, or `None` without storing anything if the key is not present.
    pub fn update<Q>(&mut self, key: &Q, value: V) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let idx = self.find(key)?;
        self.nodes[idx].value.replace(value)
    }

    /// Remove the element with the specified `key`.
    ///
    /// Returns the removed value, or `None` if the key is not present.
    ///
    /// # Examples
    /// ```
    /// use skipjack::SkipList;
    ///
    /// let mut skiplist = SkipList::new();
    /// skiplist.set("dc", 123);
    ///
    /// assert_eq!(skiplist.delete("dc"), Some(123));
    /// assert_eq!(skiplist.delete("dc"), None);
    /// assert!(skiplist.is_empty());
    /// ```
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut scratch = mem::take(&mut self.scratch);
        self.locate(key, &mut scratch);

        let target = match self.nodes[scratch.update[0]].next() {
            Some(idx) if self.nodes[idx].cmp_key(key) == Ordering::Equal => idx,
            _ => {
                self.scratch = scratch;
                return None;
            }
        };

        for level_idx in 0..self.level {
            let removed = self.nodes[target]
                .levels
                .get(level_idx)
                .copied()
                .unwrap_or_default();
            let prev = &mut self.nodes[scratch.update[level_idx]].levels[level_idx];
            if prev.forward == Some(target) {
                prev.span = prev.span + removed.span - 1;
                prev.forward = removed.forward;
            } else {
                prev.span -= 1;
            }
        }

        if self.tail == Some(target) {
            self.tail = Some(scratch.update[0]).filter(|&idx| idx != HEAD);
        }

        let previous_level = self.level;
        while self.level > 1 && self.nodes[HEAD].levels[self.level - 1].forward.is_none() {
            self.level -= 1;
        }
        if self.level != previous_level {
            trace!(from = previous_level, to = self.level, "lowering skip list height");
        }

        self.length -= 1;

        // Fill the hole in the arena with the last node so that the arena stays dense.
        let last_idx = self.nodes.len() - 1;
        if target != last_idx {
            self.relocate(last_idx, target, &mut scratch);
        }
        let removed = self.nodes.swap_remove(target);

        self.scratch = scratch;
        removed.value
    }

    /// Return the arena index of the node holding `key`.
    fn find<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.seek(key, Stop::AtOrBefore) {
            (HEAD, _) => None,
            (idx, _) if self.nodes[idx].cmp_key(key) == Ordering::Equal => Some(idx),
            _ => None,
        }
    }

    /// Descend from the top of the head's tower, returning the node the search stopped on and
    /// its level 0 distance from the head.
    fn seek<Q>(&self, key: &Q, stop: Stop) -> (usize, usize)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = HEAD;
        let mut traversed = 0;
        for level_idx in (0..self.level).rev() {
            while let Some(next) = self.nodes[current].levels[level_idx].forward {
                if !stop.advances(self.nodes[next].cmp_key(key)) {
                    break;
                }

                traversed += self.nodes[current].levels[level_idx].span;
                current = next;
            }
        }

        (current, traversed)
    }

    /// Like [`seek`](Self::seek) with [`Stop::Before`], but records the last node visited and its
    /// rank on every active level.
    fn locate<Q>(&self, key: &Q, scratch: &mut Scratch)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = HEAD;
        let mut traversed = 0;
        for level_idx in (0..self.level).rev() {
            while let Some(next) = self.nodes[current].levels[level_idx].forward {
                if self.nodes[next].cmp_key(key) != Ordering::Less {
                    break;
                }

                traversed += self.nodes[current].levels[level_idx].span;
                current = next;
            }

            scratch.update[level_idx] = current;
            scratch.rank[level_idx] = traversed;
        }
    }

    /// Re-point every link to the node at `from` so that it targets `to` instead.
    fn relocate(&mut self, from: usize, to: usize, scratch: &mut Scratch) {
        match self.nodes[from].key.as_ref() {
            Some(key) => self.locate(key, scratch),
            None => unreachable!("the head node is never relocated"),
        }

        for level_idx in 0..self.nodes[from].levels.len() {
            self.nodes[scratch.update[level_idx]].levels[level_idx].forward = Some(to);
        }

        if self.tail == Some(from) {
            self.tail = Some(to);
        }
    }
}

/// Implementation for keys and values that implement `Clone`
impl<K, V, G> SkipList<K, V, G>
where
    K: Clone,
    V: Clone,
{
    /// Eagerly returns the entries stored in the skip list as `Vec<(K,V)>` with cloned values.
    pub fn entries(&self) -> Vec<(K, V)> {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl<K: Ord, V> Default for SkipList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Debug, V: Debug, G> Debug for SkipList<K, V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for SkipList<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut skiplist = SkipList::new();
        skiplist.extend(iter);
        skiplist
    }
}

impl<K: Ord, V, G: LevelGenerator> Extend<(K, V)> for SkipList<K, V, G> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<'a, K, V, G> IntoIterator for &'a SkipList<K, V, G> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

/// An iterator over the entries of a `SkipList`.
///
/// This `struct` is created by the [`iter`] and [`range`] methods.
///
/// [`iter`]: SkipList::iter
/// [`range`]: SkipList::range
pub struct Iter<'a, K, V> {
    nodes: &'a [SkipNode<K, V>],
    next: Option<usize>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let current_node = &self.nodes[self.next?];
        self.next = current_node.next();
        self.remaining -= 1;

        Some(current_node.entry())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            next: self.next,
            remaining: self.remaining,
        }
    }
}

/// An iterator over the keys of a `SkipList`.
///
/// This `struct` is created by the [`keys`] method.
///
/// [`keys`]: SkipList::keys
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `SkipList`.
///
/// This `struct` is created by the [`values`] method.
///
/// [`values`]: SkipList::values
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

#[cfg(test)]
impl<K: Ord + Debug, V, G> SkipList<K, V, G> {
    /// Check every structural invariant against an independent walk of level 0.
    fn assert_consistent(&self) {
        assert_eq!(self.nodes.len(), self.length + 1, "arena must stay dense");
        assert!((1..=self.max_level).contains(&self.level));

        // Level 0 position of every node, with the head at 0.
        let mut positions = vec![None; self.nodes.len()];
        positions[HEAD] = Some(0);
        let mut count = 0;
        let mut current = HEAD;
        while let Some(next) = self.nodes[current].next() {
            if current != HEAD {
                let (previous_key, _) = self.nodes[current].entry();
                let (next_key, _) = self.nodes[next].entry();
                assert!(previous_key < next_key, "{:?} !< {:?}", previous_key, next_key);
            }

            count += 1;
            positions[next] = Some(count);
            current = next;
        }

        assert_eq!(count, self.length);
        assert_eq!(self.tail, Some(current).filter(|&idx| idx != HEAD));

        for level_idx in 0..self.level {
            let mut reached = 0;
            let mut current = HEAD;
            loop {
                let link = self.nodes[current].levels[level_idx];
                let position = positions[current].expect("every node is reachable on level 0");
                match link.forward {
                    Some(next) => {
                        let next_position = positions[next].expect("linked node is on level 0");
                        assert!(next_position > position);
                        assert_eq!(link.span, next_position - position);
                        reached += 1;
                        current = next;
                    }
                    None => {
                        assert_eq!(link.span, self.length - position);
                        break;
                    }
                }
            }

            let towers = self.nodes[1..]
                .iter()
                .filter(|node| node.levels.len() > level_idx)
                .count();
            assert_eq!(reached, towers, "level {} is missing nodes", level_idx);
        }

        assert!(self.nodes[1..]
            .iter()
            .all(|node| node.levels.len() <= self.level));
        if self.level > 1 {
            assert!(self.nodes[HEAD].levels[self.level - 1].forward.is_some());
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    #[derive(Clone, Debug)]
    enum Op {
        Set(String, u32),
        Delete(String),
        Update(String, u32),
    }

    fn op() -> impl Strategy<Value = Op> {
        let key = "[a-e]{0,3}";
        prop_oneof![
            3 => (key, any::<u32>()).prop_map(|(key, value)| Op::Set(key, value)),
            2 => key.prop_map(Op::Delete),
            1 => (key, any::<u32>()).prop_map(|(key, value)| Op::Update(key, value)),
        ]
    }

    proptest! {
        #[test]
        fn matches_an_ordered_map_model(ops in vec(op(), 0..200), seed in any::<u64>()) {
            let options = SkipListOptions::default().max_level(12).probability(0.5).seed(seed);
            let mut skiplist = SkipList::with_options(options).unwrap();
            let mut model = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Set(key, value) => {
                        let stored = *skiplist.set(key.clone(), value).value();
                        prop_assert_eq!(stored, value);
                        model.insert(key, value);
                    }
                    Op::Delete(key) => {
                        prop_assert_eq!(skiplist.delete(key.as_str()), model.remove(&key));
                    }
                    Op::Update(key, value) => {
                        let expected = model.get_mut(&key).map(|slot| mem::replace(slot, value));
                        prop_assert_eq!(skiplist.update(key.as_str(), value), expected);
                    }
                }
                prop_assert_eq!(skiplist.len(), model.len());
            }

            skiplist.assert_consistent();
            prop_assert_eq!(
                skiplist.entries(),
                model.iter().map(|(key, value)| (key.clone(), *value)).collect::<Vec<_>>()
            );
            for (position, (key, value)) in model.iter().enumerate() {
                prop_assert_eq!(skiplist.get(key.as_str()).map(|node| *node.value()), Some(*value));
                prop_assert_eq!(skiplist.rank(key.as_str()), Some(position));
            }
            prop_assert_eq!(skiplist.last().map(|node| node.key().clone()), model.keys().last().cloned());
        }

        #[test]
        fn keys_are_strictly_ascending(keys in vec("[a-z]{0,6}", 0..300)) {
            let skiplist: SkipList<String, ()> = keys.iter().cloned().map(|key| (key, ())).collect();

            let listed: Vec<&String> = skiplist.keys().collect();
            prop_assert!(listed.windows(2).all(|pair| pair[0].as_bytes() < pair[1].as_bytes()));

            let mut expected = keys.clone();
            expected.sort();
            expected.dedup();
            prop_assert_eq!(listed.len(), expected.len());
            skiplist.assert_consistent();
        }

        #[test]
        fn ranges_match_the_model(
            keys in vec(0u16..500, 0..200),
            low in 0u16..500,
            high in 0u16..500,
        ) {
            let skiplist: SkipList<u16, u16> = keys.iter().map(|&key| (key, key)).collect();
            let model: BTreeMap<u16, u16> = keys.iter().map(|&key| (key, key)).collect();

            let expected: Vec<u16> = if low <= high {
                model.range(low..=high).map(|(key, _)| *key).collect()
            } else {
                Vec::new()
            };
            let actual = skiplist.range(low..=high);
            prop_assert_eq!(actual.len(), expected.len());
            prop_assert_eq!(actual.map(|(key, _)| *key).collect::<Vec<_>>(), expected);
        }
    }
}
