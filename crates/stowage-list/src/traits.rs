//! Standard trait implementations for [`List`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use stowage_core::compare;

use crate::cursor::{IntoIter, Iter, IterMut};
use crate::list::List;

impl<T: Clone> Clone for List<T> {
    fn clone(&self) -> Self {
        let mut out = Self::new();
        if let Err(err) = out.append_iter(self.iter().cloned()) {
            err.raise();
        }
        out
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && compare::equal(self.begin(), self.end(), other.begin())
    }
}

impl<T: Eq> Eq for List<T> {}

impl<T: PartialOrd> PartialOrd for List<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        compare::lexicographic_partial_cmp(self.begin(), self.end(), other.begin(), other.end())
    }
}

impl<T: Ord> Ord for List<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        compare::lexicographic_cmp(self.begin(), self.end(), other.begin(), other.end())
    }
}

impl<T: Hash> Hash for List<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for value in self {
            value.hash(state);
        }
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for List<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(err) = self.append_iter(iter) {
            err.raise();
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for List<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter::new(self)
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut List<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut h = DefaultHasher::new();
        value.hash(&mut h);
        h.finish()
    }

    #[test]
    fn relational_operators_are_lexicographic() {
        let a: List<i32> = [1, 2, 3].into_iter().collect();
        let b: List<i32> = [1, 2, 4].into_iter().collect();
        let prefix: List<i32> = [1, 2].into_iter().collect();
        assert!(a < b);
        assert!(prefix < a);
        assert_ne!(a, prefix);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn equal_lists_hash_alike_regardless_of_layout() {
        let a: List<i32> = [1, 2, 3].into_iter().collect();
        let mut b: List<i32> = [3, 1, 2].into_iter().collect();
        b.sort();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn clone_is_independent() {
        let a: List<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        let mut b = a.clone();
        b.push_back("z".into()).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(format!("{b:?}"), r#"["x", "y", "z"]"#);
    }

    #[test]
    fn borrowing_loops() {
        let mut list: List<i32> = List::new();
        list.extend(&[1, 2, 3]);
        for x in &mut list {
            *x *= 2;
        }
        let mut sum = 0;
        for x in &list {
            sum += x;
        }
        assert_eq!(sum, 12);
    }
}
