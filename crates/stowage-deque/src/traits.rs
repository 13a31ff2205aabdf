//! Standard trait implementations for [`Deque`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut};

use stowage_core::compare;

use crate::deque::Deque;
use crate::iter::{IntoIter, Iter, IterMut};

impl<T: Clone, const B: usize> Clone for Deque<T, B> {
    fn clone(&self) -> Self {
        Self::from_range(self.begin(), self.end()).unwrap_or_else(|err| err.raise())
    }
}

impl<T: fmt::Debug, const B: usize> fmt::Debug for Deque<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, const B: usize> PartialEq for Deque<T, B> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && compare::equal(self.begin(), self.end(), other.begin())
    }
}

impl<T: Eq, const B: usize> Eq for Deque<T, B> {}

impl<T: PartialOrd, const B: usize> PartialOrd for Deque<T, B> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        compare::lexicographic_partial_cmp(self.begin(), self.end(), other.begin(), other.end())
    }
}

impl<T: Ord, const B: usize> Ord for Deque<T, B> {
    fn cmp(&self, other: &Self) -> Ordering {
        compare::lexicographic_cmp(self.begin(), self.end(), other.begin(), other.end())
    }
}

impl<T: Hash, const B: usize> Hash for Deque<T, B> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for value in self {
            value.hash(state);
        }
    }
}

impl<T, const B: usize> Index<usize> for Deque<T, B> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        let len = self.len();
        self.get(index)
            .unwrap_or_else(|| panic!("index {index} out of range for deque of length {len}"))
    }
}

impl<T, const B: usize> IndexMut<usize> for Deque<T, B> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        self.get_mut(index)
            .unwrap_or_else(|| panic!("index {index} out of range for deque of length {len}"))
    }
}

impl<T, const B: usize> FromIterator<T> for Deque<T, B> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut d = Self::new();
        d.extend(iter);
        d
    }
}

impl<T, const B: usize> Extend<T> for Deque<T, B> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            if let Err(err) = self.push_back(value) {
                err.raise();
            }
        }
    }
}

impl<'a, T: Copy + 'a, const B: usize> Extend<&'a T> for Deque<T, B> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, const B: usize> IntoIterator for Deque<T, B> {
    type Item = T;
    type IntoIter = IntoIter<T, B>;

    fn into_iter(self) -> IntoIter<T, B> {
        IntoIter::new(self)
    }
}

impl<'a, T, const B: usize> IntoIterator for &'a Deque<T, B> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, const B: usize> IntoIterator for &'a mut Deque<T, B> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T, B>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T: Clone, const B: usize> From<&[T]> for Deque<T, B> {
    fn from(src: &[T]) -> Self {
        Self::from_slice(src).unwrap_or_else(|err| err.raise())
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
        let a: Deque<i32, 4> = [1, 2, 3].into_iter().collect();
        let b: Deque<i32, 4> = [1, 2, 4].into_iter().collect();
        let prefix: Deque<i32, 4> = [1, 2].into_iter().collect();
        assert!(a < b);
        assert!(prefix < a);
        assert_ne!(a, prefix);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn equal_contents_hash_alike_regardless_of_layout() {
        let mut a: Deque<i32, 4> = Deque::new();
        for i in (0..6).rev() {
            a.push_front(i).unwrap();
        }
        let b: Deque<i32, 4> = (0..6).collect();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn clone_is_independent() {
        let a: Deque<String, 4> = ["x", "y", "z", "w", "v"].iter().map(|s| s.to_string()).collect();
        let mut b = a.clone();
        b[0].push('!');
        assert_eq!(a[0], "x");
        assert_eq!(b[0], "x!");
        assert_eq!(format!("{a:?}"), r#"["x", "y", "z", "w", "v"]"#);
    }

    #[test]
    #[should_panic(expected = "index 3 out of range for deque of length 3")]
    fn index_past_end_panics() {
        let d: Deque<i32, 4> = Deque::from(&[1, 2, 3][..]);
        let _ = d[3];
    }

    #[test]
    fn borrowing_loops() {
        let mut d: Deque<i32, 4> = Deque::new();
        d.extend(&[1, 2, 3]);
        for x in &mut d {
            *x += 1;
        }
        let mut sum = 0;
        for x in &d {
            sum += x;
        }
        assert_eq!(sum, 9);
    }
}
