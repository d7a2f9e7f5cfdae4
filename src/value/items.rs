//! The items a loop visits.

use std::vec;

use crate::Value;

/// A window of a collection, consumed one item at a time.
///
/// Ranges are enumerated as they are consumed so a loop that stops early
/// never holds more than the current item.
#[derive(Debug)]
pub(crate) struct Items {
    inner: Inner,
    reversed: bool,
}

#[derive(Debug)]
enum Inner {
    List(vec::IntoIter<Value>),
    /// Inclusive bounds, empty once `front > back`.
    Range { front: i128, back: i128 },
}

/// The number of integers in `a..b`, zero if `b < a`.
pub(crate) fn range_len(a: i64, b: i64) -> i128 {
    (i128::from(b) - i128::from(a) + 1).max(0)
}

impl Items {
    pub(crate) fn list(items: Vec<Value>) -> Self {
        Self {
            inner: Inner::List(items.into_iter()),
            reversed: false,
        }
    }

    /// The part of `a..b` from the `from`th item up to but excluding the
    /// `to`th.
    pub(crate) fn range(a: i64, b: i64, from: usize, to: Option<usize>) -> Self {
        let start = i128::from(a);
        let mut back = i128::from(b);
        if let Some(to) = to {
            back = back.min(start + to as i128 - 1);
        }
        Self {
            inner: Inner::Range {
                front: start + from as i128,
                back,
            },
            reversed: false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        match &self.inner {
            Inner::List(iter) => iter.len(),
            Inner::Range { front, back } => {
                usize::try_from((back - front + 1).max(0)).unwrap_or(usize::MAX)
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn reverse(&mut self) {
        self.reversed = !self.reversed;
    }
}

impl Inner {
    fn next_front(&mut self) -> Option<Value> {
        match self {
            Self::List(iter) => iter.next(),
            Self::Range { front, back } => {
                if *front > *back {
                    return None;
                }
                let item = *front;
                *front += 1;
                i64::try_from(item).ok().map(Value::Integer)
            }
        }
    }

    fn next_back(&mut self) -> Option<Value> {
        match self {
            Self::List(iter) => iter.next_back(),
            Self::Range { front, back } => {
                if *front > *back {
                    return None;
                }
                let item = *back;
                *back -= 1;
                i64::try_from(item).ok().map(Value::Integer)
            }
        }
    }
}

impl Iterator for Items {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reversed {
            true => self.inner.next_back(),
            false => self.inner.next_front(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(items: impl Iterator<Item = Value>) -> Vec<i64> {
        items
            .map(|v| match v {
                Value::Integer(i) => i,
                v => panic!("expected integer, got {v:?}"),
            })
            .collect()
    }

    #[test]
    fn range_window() {
        assert_eq!(ints(Items::range(1, 6, 2, Some(4))), [3, 4]);
        assert_eq!(ints(Items::range(1, 6, 5, None)), [6]);
        assert!(Items::range(1, 6, 9, None).is_empty());
        assert!(Items::range(5, 1, 0, None).is_empty());
    }

    #[test]
    fn range_reversed() {
        let mut items = Items::range(1, 5, 1, Some(4));
        items.reverse();
        assert_eq!(items.len(), 3);
        assert_eq!(ints(items), [4, 3, 2]);
    }

    #[test]
    fn range_extremes() {
        let items = Items::range(i64::MIN, i64::MAX, 0, None);
        assert_eq!(items.len(), usize::MAX);
        assert_eq!(ints(items.take(2)), [i64::MIN, i64::MIN + 1]);

        let mut items = Items::range(i64::MIN, i64::MAX, 0, None);
        items.reverse();
        assert_eq!(ints(items.take(2)), [i64::MAX, i64::MAX - 1]);

        let items = Items::range(i64::MAX - 1, i64::MAX, 0, None);
        assert_eq!(ints(items), [i64::MAX - 1, i64::MAX]);
    }

    #[test]
    fn range_len_does_not_overflow() {
        assert_eq!(range_len(-9_000_000_000_000_000_000, 9_000_000_000_000_000_000), 18_000_000_000_000_000_001);
        assert_eq!(range_len(3, 1), 0);
    }

    #[test]
    fn list_reversed() {
        let mut items = Items::list(vec![Value::from(1), Value::from(2)]);
        items.reverse();
        assert_eq!(items.collect::<Vec<_>>(), [Value::from(2), Value::from(1)]);
    }
}
