use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;
use core::marker::PhantomData;

use log::debug;

use crate::DefaultHashBuilder;
use crate::config::INITIAL_CAPACITY;
use crate::config::INITIAL_NEIGHBORHOOD;
use crate::config::dimensions_for;
use crate::element_store;
use crate::element_store::ElementStore;
use crate::error::Error;
use crate::error::Result;
use crate::hash_table::BucketTable;
use crate::hash_table::Location;

/// A hash map using hopscotch hashing, iterating in insertion order.
///
/// Every key lives within a bounded distance (the neighborhood) of its ideal
/// bucket, so a lookup touches at most `neighborhood_size()` slots plus, in
/// the rare case where displacement failed, a short overflow list. Keys and
/// values are owned by an insertion-ordered element store; the bucket array
/// only holds references into it, which keeps growth cheap and iteration
/// order stable.
///
/// Inserting a key that is already present does not replace the stored
/// value.
///
/// # Examples
///
/// ```rust
/// use hopscotch_map::HashMap;
///
/// let mut map = HashMap::new();
/// assert!(map.insert(1, "a"));
/// assert!(map.insert(2, "b"));
/// assert!(!map.insert(1, "c"));
///
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get(&1), Some(&"a"));
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 2]);
/// ```
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    elements: ElementStore<K, V>,
    table: BucketTable,
    hash_builder: S,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> HashMap<K, V, DefaultHashBuilder> {
    /// Creates an empty map with the default hasher builder.
    ///
    /// The map starts with three buckets and a neighborhood of two.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 3);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates an empty map able to hold `capacity` elements without growing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::HashMap;
    ///
    /// let map: HashMap<i32, String> = HashMap::with_capacity(100);
    /// assert!(map.max_population() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Creates an empty map with the given hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use hopscotch_map::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            elements: ElementStore::new(),
            table: BucketTable::new(INITIAL_CAPACITY, INITIAL_NEIGHBORHOOD),
            hash_builder,
        }
    }

    /// Creates an empty map with the given hasher builder, able to hold
    /// `capacity` elements without growing.
    ///
    /// The bucket count and neighborhood grow from their initial values by
    /// the usual growth factor until `capacity` fits under the load factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use hopscotch_map::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_capacity_and_hasher(100, SimpleHasher);
    /// assert!(map.max_population() >= 100);
    /// assert!(map.capacity() > 100);
    /// ```
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let (buckets, neighborhood) =
            dimensions_for(capacity, INITIAL_CAPACITY, INITIAL_NEIGHBORHOOD);
        Self {
            elements: ElementStore::with_capacity(capacity),
            table: BucketTable::new(buckets, neighborhood),
            hash_builder,
        }
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the number of buckets in the table.
    ///
    /// This is not the number of elements the map can hold before growing;
    /// see [`max_population`](Self::max_population) for that.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the current neighborhood size: the largest distance, in
    /// buckets, between an in-table element and its ideal bucket, plus one.
    pub fn neighborhood_size(&self) -> usize {
        self.table.neighborhood()
    }

    /// Returns the number of elements the map can hold before the next
    /// insert grows the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// for i in 0..map.max_population() {
    ///     map.insert(i, ());
    /// }
    /// let buckets = map.capacity();
    /// map.insert(usize::MAX, ());
    /// assert!(map.capacity() > buckets);
    /// ```
    pub fn max_population(&self) -> usize {
        self.table.max_population()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes all elements from the map.
    ///
    /// The bucket count and neighborhood size are kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::HashMap;
    ///
    /// let mut map: HashMap<_, _> = (0..10).map(|i| (i, i)).collect();
    /// let buckets = map.capacity();
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), buckets);
    /// assert_eq!(map.get(&3), None);
    /// ```
    pub fn clear(&mut self) {
        self.elements.clear();
        self.table.clear();
    }

    /// Grows the table, if needed, so that `additional` more elements fit
    /// under the load factor.
    ///
    /// Growth rebuilds the whole table from the element store using each
    /// element's cached hash; the hasher is not invoked.
    ///
    /// # Panics
    ///
    /// Panics if the new bucket count overflows `usize`.
    pub fn reserve(&mut self, additional: usize) {
        let population = self
            .len()
            .checked_add(additional)
            .expect("capacity overflow");
        let (capacity, neighborhood) =
            dimensions_for(population, self.table.capacity(), self.table.neighborhood());
        if capacity == self.table.capacity() {
            return;
        }

        debug!(
            "growing table from {} to {capacity} buckets (neighborhood {} -> {neighborhood}) at {} elements",
            self.table.capacity(),
            self.table.neighborhood(),
            self.len()
        );
        self.table = BucketTable::build(capacity, neighborhood, &mut self.elements);
    }

    /// An iterator visiting all key-value pairs in insertion order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert("b", 2);
    /// map.insert("a", 1);
    /// map.insert("c", 3);
    ///
    /// let pairs: Vec<_> = map.iter().collect();
    /// assert_eq!(pairs, [(&"b", &2), (&"a", &1), (&"c", &3)]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.elements.iter(),
        }
    }

    /// An iterator visiting all key-value pairs in insertion order, with
    /// mutable references to the values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::HashMap;
    ///
    /// let mut map = HashMap::from([(1, 10), (2, 20)]);
    /// for (_, value) in map.iter_mut() {
    ///     *value += 1;
    /// }
    /// assert_eq!(map.get(&2), Some(&21));
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.elements.iter_mut(),
        }
    }

    /// An iterator visiting all keys in insertion order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// An iterator visiting all values in insertion order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// An iterator visiting all values mutably in insertion order.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Clears the map, returning all key-value pairs in insertion order.
    ///
    /// The map is empty as soon as `drain` returns, even if the iterator is
    /// dropped before it is exhausted. The bucket count is kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::HashMap;
    ///
    /// let mut map = HashMap::from([(1, "a"), (2, "b")]);
    /// let drained: Vec<_> = map.drain().collect();
    /// assert_eq!(drained, [(1, "a"), (2, "b")]);
    /// assert!(map.is_empty());
    /// ```
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        self.table.clear();
        Drain {
            inner: IntoIter {
                elements: core::mem::take(&mut self.elements),
            },
            marker: PhantomData,
        }
    }

    /// Returns utilization statistics for the underlying table.
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> crate::TableStats {
        self.table.stats(self.len())
    }

    /// Returns the distribution of element distances from their ideal
    /// buckets.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> crate::ProbeHistogram {
        self.table.probe_histogram()
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn locate<Q>(&self, key: &Q) -> Option<Location>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let bucket = self.table.ideal_bucket(self.hash_builder.hash_one(key));
        self.table
            .find(bucket, &self.elements, |candidate| candidate.borrow() == key)
    }

    /// Inserts a key-value pair if the key is not already present.
    ///
    /// Returns `true` if the pair was inserted. If the key is present, the
    /// stored value is left untouched and `value` is dropped. The table grows
    /// first whenever one more element would exceed the load factor, whether
    /// or not the key turns out to be present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// assert!(map.insert(37, "a"));
    /// assert!(!map.insert(37, "b"));
    /// assert_eq!(map[&37], "a");
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        match self.entry(key) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    /// Returns a mutable reference to the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::HashMap;
    ///
    /// let mut counts: HashMap<&str, u32> = HashMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.get_or_insert_default(word) += 1;
    /// }
    /// assert_eq!(counts[&"a"], 2);
    /// assert_eq!(counts[&"b"], 1);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    /// Returns a reference to the value for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::HashMap;
    ///
    /// let mut map = HashMap::new();
    /// map.insert(String::from("one"), 1);
    /// assert_eq!(map.get("one"), Some(&1));
    /// assert_eq!(map.get("two"), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let location = self.locate(key)?;
        Some(&self.elements[location.element].value)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let location = self.locate(key)?;
        Some(&mut self.elements[location.element].value)
    }

    /// Returns the stored key and its value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let location = self.locate(key)?;
        let element = &self.elements[location.element];
        Some((&element.key, &element.value))
    }

    /// Returns `true` if the map contains `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).is_some()
    }

    /// Returns a reference to the value for `key`, or
    /// [`Error::KeyNotFound`] if it is absent.
    ///
    /// Never inserts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::Error;
    /// use hopscotch_map::HashMap;
    ///
    /// let map = HashMap::from([(1, "a")]);
    /// assert_eq!(map.at(&1), Ok(&"a"));
    /// assert_eq!(map.at(&5), Err(Error::KeyNotFound));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn at<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Removes `key` from the map, returning its value if it was present.
    ///
    /// Removing an absent key does nothing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::HashMap;
    ///
    /// let mut map = HashMap::from([(1, "a")]);
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes `key` from the map, returning the stored key and value.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let location = self.locate(key)?;
        Some(remove_located(&mut self.elements, &mut self.table, location))
    }

    /// Gets the entry for `key` for in-place manipulation.
    ///
    /// Like [`insert`](Self::insert), this grows the table first if one more
    /// element would exceed the load factor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::HashMap;
    ///
    /// let mut map: HashMap<&str, Vec<u32>> = HashMap::new();
    /// map.entry("a").or_default().push(1);
    /// map.entry("a").or_default().push(2);
    /// map.entry("b").and_modify(|v| v.push(0)).or_insert_with(Vec::new);
    ///
    /// assert_eq!(map[&"a"], [1, 2]);
    /// assert!(map[&"b"].is_empty());
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V> {
        self.reserve(1);

        let hash = self.hash_builder.hash_one(&key);
        let bucket = self.table.ideal_bucket(hash);
        match self
            .table
            .find(bucket, &self.elements, |candidate| *candidate == key)
        {
            Some(location) => Entry::Occupied(OccupiedEntry {
                elements: &mut self.elements,
                table: &mut self.table,
                location,
            }),
            None => Entry::Vacant(VacantEntry {
                elements: &mut self.elements,
                table: &mut self.table,
                key,
                hash,
                bucket,
            }),
        }
    }

    /// Asserts every structural invariant of the map.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        self.table.check_invariants(&self.elements);
        assert!(self.len() <= self.max_population());
        for element in self.elements.iter() {
            assert_eq!(element.hash, self.hash_builder.hash_one(&element.key));
            assert_eq!(element.bucket, self.table.ideal_bucket(element.hash));
            assert!(self.contains_key(&element.key));
        }
    }
}

fn remove_located<K, V>(
    elements: &mut ElementStore<K, V>,
    table: &mut BucketTable,
    location: Location,
) -> (K, V) {
    table.erase(location, elements[location.element].bucket);
    match elements.remove(location.element) {
        Some(pair) => pair,
        None => unreachable!("located element missing from the store"),
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> Clone for HashMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    /// Deep-copies every element into a table with the same bucket count and
    /// neighborhood size. Cached hashes are reused, so the hasher is not
    /// invoked.
    fn clone(&self) -> Self {
        let mut elements = ElementStore::with_capacity(self.len());
        for element in self.elements.iter() {
            elements.push_back(
                element.key.clone(),
                element.value.clone(),
                element.hash,
                element.bucket,
            );
        }

        let table = BucketTable::build(
            self.table.capacity(),
            self.table.neighborhood(),
            &mut elements,
        );

        Self {
            elements,
            table,
            hash_builder: self.hash_builder.clone(),
        }
    }
}

/// Two maps are equal when they hold the same keys mapped to equal values,
/// regardless of insertion order.
impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> core::ops::Index<&Q> for HashMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if `key` is not present.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found in the hash map")
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut map = Self::with_capacity_and_hasher(iter.size_hint().0, S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for HashMap<K, V, DefaultHashBuilder>
where
    K: Hash + Eq,
{
    /// Inserts the pairs in array order; a repeated key keeps its first
    /// value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use hopscotch_map::HashMap;
    ///
    /// let map: HashMap<_, _> = HashMap::from([(1, "a"), (2, "b"), (1, "c")]);
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map[&1], "a");
    /// ```
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        // Duplicates are likely when extending a populated map.
        let additional = if self.is_empty() {
            iter.size_hint().0
        } else {
            iter.size_hint().0.div_ceil(2)
        };
        self.reserve(additional);

        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, S> Extend<(&'a K, &'a V)> for HashMap<K, V, S>
where
    K: Hash + Eq + Copy,
    V: Copy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            elements: self.elements,
        }
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V>),
}

impl<'a, K, V> Entry<'a, K, V> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference to the value.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V> Entry<'a, K, V>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V> {
    elements: &'a mut ElementStore<K, V>,
    table: &'a mut BucketTable,
    key: K,
    hash: u64,
    bucket: usize,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Appends the pair to the map and returns a mutable reference to the
    /// value.
    pub fn insert(self, value: V) -> &'a mut V {
        let Self {
            elements,
            table,
            key,
            hash,
            bucket,
        } = self;

        let element = elements.push_back(key, value, hash, bucket);
        table.place(element, elements);
        &mut elements[element].value
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V> {
    elements: &'a mut ElementStore<K, V>,
    table: &'a mut BucketTable,
    location: Location,
}

impl<'a, K, V> OccupiedEntry<'a, K, V> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.elements[self.location.element].key
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.elements[self.location.element].value
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.elements[self.location.element].value
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.elements[self.location.element].value
    }

    /// Replaces the value in the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        remove_located(self.elements, self.table, self.location)
    }
}

/// An iterator over the key-value pairs of a `HashMap`, in insertion order.
pub struct Iter<'a, K, V> {
    inner: element_store::Iter<'a, K, V>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the key-value pairs of a `HashMap`, in insertion
/// order.
pub struct IterMut<'a, K, V> {
    inner: element_store::IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (&e.key, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// An owning iterator over the key-value pairs of a `HashMap`, in insertion
/// order.
pub struct IntoIter<K, V> {
    elements: ElementStore<K, V>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.elements.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.elements.len(), Some(self.elements.len()))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V> {
    inner: IntoIter<K, V>,
    marker: PhantomData<&'a mut ElementStore<K, V>>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}
impl<K, V> FusedIterator for Drain<'_, K, V> {}
