use core::{
	borrow::Borrow,
	hash::{BuildHasher, Hash},
};
use hashbrown::{
	hash_map::{DefaultHashBuilder, Entry, ExtractIf},
	HashMap,
};
use num_traits::{CheckedAdd, CheckedSub, One, Zero};

/// Native listeners keyed by event type, each with the number of delegation rules that rely on it.
///
/// Registering a rule increments its type's count, creating the listener only for the first one. [`Engine::off`](`crate::Engine::off`)
/// decrements without removing, and listeners whose count dropped to zero are taken out through
/// [`RcHashMap::drain_weak`] so they can be uninstalled from the document.
#[derive(Debug)]
pub struct RcHashMap<K, C, V, S = DefaultHashBuilder>(HashMap<K, (C, V), S>)
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero,
	S: BuildHasher;
impl<K, C, V, S> Default for RcHashMap<K, C, V, S>
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero + Copy,
	S: Default + BuildHasher,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<K, C, V, S> RcHashMap<K, C, V, S>
where
	K: Hash + Eq,
	C: CheckedAdd + CheckedSub + One + Zero + Copy,
	S: BuildHasher,
{
	#[must_use]
	pub fn new() -> Self
	where
		S: Default,
	{
		Self(HashMap::with_hasher(S::default()))
	}

	/// Counts one more rule for event type `k`, installing its listener through `v` if this is the first.
	pub fn increment_or_insert_with<F: FnOnce() -> V>(&mut self, k: K, v: F) -> Result<&mut V, CountSaturatedError> {
		match self.0.entry(k) {
			Entry::Occupied(occupied) => {
				let (c, v) = occupied.into_mut();
				*c = c.checked_add(&C::one()).ok_or(CountSaturatedError)?;
				Ok(v)
			}
			Entry::Vacant(vacant) => {
				let (_, v) = vacant.insert((C::one(), v()));
				Ok(v)
			}
		}
	}

	/// Counts one rule less for event type `k`. The listener stays until [`RcHashMap::drain_weak`].
	pub fn weak_decrement<Q: ?Sized>(&mut self, k: &Q) -> Result<Option<&mut V>, CountSaturatedError>
	where
		K: Borrow<Q>,
		Q: Eq + Hash,
	{
		match self.0.get_mut(k) {
			Some((c, v)) => {
				*c = c.checked_sub(&C::one()).ok_or(CountSaturatedError)?;
				Ok(Some(v))
			}
			None => Ok(None),
		}
	}

	/// Removes and yields the listeners that no rule relies on anymore.
	pub fn drain_weak(&mut self) -> DrainWeak<'_, K, C, V> {
		DrainWeak(self.0.extract_if(DrainWeak::<K, C, V>::weak_filter as fn(&K, &mut (C, V)) -> bool))
	}
}

/// Unused listeners, see [`RcHashMap::drain_weak`].
pub struct DrainWeak<'a, K, C, V>(ExtractIf<'a, K, (C, V), fn(&K, &mut (C, V)) -> bool>);
impl<'a, K, C, V> DrainWeak<'a, K, C, V>
where
	C: Zero,
{
	fn weak_filter(_: &K, (c, _): &mut (C, V)) -> bool {
		c.is_zero()
	}
}
impl<'a, K, C, V> Iterator for DrainWeak<'a, K, C, V> {
	type Item = (K, V);

	fn next(&mut self) -> Option<Self::Item> {
		self.0.next().map(|(k, (_, v))| (k, v))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.0.size_hint()
	}
}

/// Too many rules for one event type, or a count dropped below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSaturatedError;

#[cfg(test)]
mod tests {
	use super::{CountSaturatedError, RcHashMap};

	#[test]
	fn entries_are_drained_at_zero() {
		let mut map = RcHashMap::<&str, u8, usize>::new();
		let mut created = 0;
		for _ in 0..2 {
			map.increment_or_insert_with("click", || {
				created += 1;
				created
			})
			.unwrap();
		}
		map.increment_or_insert_with("input", || 10).unwrap();
		assert_eq!(created, 1);

		assert_eq!(map.weak_decrement("click"), Ok(Some(&mut 1)));
		assert_eq!(map.drain_weak().count(), 0);
		assert_eq!(map.weak_decrement("click"), Ok(Some(&mut 1)));
		assert_eq!(map.drain_weak().collect::<Vec<_>>(), [("click", 1)]);
		assert_eq!(map.weak_decrement("click"), Ok(None));
	}

	#[test]
	fn default_is_empty() {
		let mut map = RcHashMap::<String, u16, ()>::default();
		assert_eq!(map.weak_decrement("click"), Ok(None));
		assert_eq!(map.drain_weak().count(), 0);
	}

	#[test]
	fn counts_saturate() {
		let mut map = RcHashMap::<&str, u8, ()>::new();
		for _ in 0..u8::MAX {
			map.increment_or_insert_with("click", || ()).unwrap();
		}
		assert_eq!(map.increment_or_insert_with("click", || ()), Err(CountSaturatedError));

		let mut map = RcHashMap::<&str, u8, ()>::new();
		map.increment_or_insert_with("click", || ()).unwrap();
		map.weak_decrement("click").unwrap();
		assert_eq!(map.weak_decrement("click"), Err(CountSaturatedError));
	}
}
