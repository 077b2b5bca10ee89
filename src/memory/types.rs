//! Value types held by the in-memory keyspace.
//!
//! Sets and hashes use ordered containers so that replies come back in a
//! stable order, which keeps test assertions simple.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

#[derive(Debug, Clone)]
pub enum Value {
    Str(Vec<u8>),
    List(VecDeque<Vec<u8>>),
    Hash(BTreeMap<Vec<u8>, Vec<u8>>),
    Set(BTreeSet<Vec<u8>>),
    SortedSet(ZSet),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Hash(_) => "hash",
            Value::Set(_) => "set",
            Value::SortedSet(_) => "zset",
        }
    }

    pub fn empty_list() -> Value {
        Value::List(VecDeque::new())
    }

    pub fn empty_hash() -> Value {
        Value::Hash(BTreeMap::new())
    }

    pub fn empty_set() -> Value {
        Value::Set(BTreeSet::new())
    }

    pub fn empty_zset() -> Value {
        Value::SortedSet(ZSet::default())
    }

    pub fn as_str(&self) -> Option<&Vec<u8>> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&VecDeque<Vec<u8>>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut VecDeque<Vec<u8>>> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&BTreeMap<Vec<u8>, Vec<u8>>> {
        match self {
            Value::Hash(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_hash_mut(&mut self) -> Option<&mut BTreeMap<Vec<u8>, Vec<u8>>> {
        match self {
            Value::Hash(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<Vec<u8>>> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_set_mut(&mut self) -> Option<&mut BTreeSet<Vec<u8>>> {
        match self {
            Value::Set(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_zset(&self) -> Option<&ZSet> {
        match self {
            Value::SortedSet(z) => Some(z),
            _ => None,
        }
    }

    pub fn as_zset_mut(&mut self) -> Option<&mut ZSet> {
        match self {
            Value::SortedSet(z) => Some(z),
            _ => None,
        }
    }

    /// Redis never keeps an empty aggregate around.
    pub fn is_empty_aggregate(&self) -> bool {
        match self {
            Value::Str(_) => false,
            Value::List(l) => l.is_empty(),
            Value::Hash(h) => h.is_empty(),
            Value::Set(s) => s.is_empty(),
            Value::SortedSet(z) => z.is_empty(),
        }
    }
}

/// Map an `f64` onto a `u64` whose unsigned order matches the float order.
/// `-0.0` and `0.0` are the same score.
fn orderable(score: f64) -> u64 {
    let bits = (score + 0.0).to_bits();
    if bits >> 63 == 1 { !bits } else { bits ^ (1 << 63) }
}

fn from_orderable(bits: u64) -> f64 {
    if bits >> 63 == 1 {
        f64::from_bits(bits ^ (1 << 63))
    } else {
        f64::from_bits(!bits)
    }
}

/// Sorted set: member lookup by hash, iteration in (score, member) order.
#[derive(Debug, Clone, Default)]
pub struct ZSet {
    scores: HashMap<Vec<u8>, f64>,
    order: BTreeSet<(u64, Vec<u8>)>,
}

/// One end of a score range as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub score: f64,
    pub exclusive: bool,
}

impl Bound {
    pub fn parse(raw: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(raw).ok()?;
        let (text, exclusive) = match text.strip_prefix('(') {
            Some(rest) => (rest, true),
            None => (text, false),
        };
        let score = match text {
            "-inf" => f64::NEG_INFINITY,
            "+inf" | "inf" => f64::INFINITY,
            _ => text.parse().ok()?,
        };
        if score.is_nan() {
            return None;
        }
        Some(Bound { score, exclusive })
    }

    fn admits_above(&self, score: f64) -> bool {
        if self.exclusive { score > self.score } else { score >= self.score }
    }

    fn admits_below(&self, score: f64) -> bool {
        if self.exclusive { score < self.score } else { score <= self.score }
    }
}

impl ZSet {
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Insert or rescore. Returns true if the member was new.
    pub fn insert(&mut self, member: Vec<u8>, score: f64) -> bool {
        let score = score + 0.0;
        let previous = self.scores.insert(member.clone(), score);
        if let Some(old) = previous {
            self.order.remove(&(orderable(old), member.clone()));
        }
        self.order.insert((orderable(score), member));
        previous.is_none()
    }

    pub fn remove(&mut self, member: &[u8]) -> bool {
        match self.scores.remove(member) {
            Some(score) => {
                self.order.remove(&(orderable(score), member.to_vec()));
                true
            }
            None => false,
        }
    }

    pub fn score(&self, member: &[u8]) -> Option<f64> {
        self.scores.get(member).copied()
    }

    pub fn rank(&self, member: &[u8]) -> Option<usize> {
        let score = self.score(member)?;
        Some(self.order.range(..(orderable(score), member.to_vec())).count())
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&[u8], f64)> {
        self.order
            .iter()
            .map(|(bits, member)| (member.as_slice(), from_orderable(*bits)))
    }

    /// Members in `[min, max]`, ascending.
    pub fn in_range(&self, min: Bound, max: Bound) -> Vec<(Vec<u8>, f64)> {
        self.iter()
            .filter(|(_, score)| min.admits_above(*score) && max.admits_below(*score))
            .map(|(member, score)| (member.to_vec(), score))
            .collect()
    }
}

/// Resolve a possibly negative inclusive `[start, stop]` index pair against
/// `len`, or `None` if the range is empty.
pub fn clamp_range(start: i64, stop: i64, len: usize) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orderable_round_trip() {
        for score in [0.0, -0.5, 1e300, -1e300, f64::INFINITY, f64::NEG_INFINITY, 42.0] {
            assert_eq!(from_orderable(orderable(score)), score);
        }
        assert!(orderable(-1.0) < orderable(0.0));
        assert!(orderable(0.0) < orderable(0.5));
        assert!(orderable(f64::NEG_INFINITY) < orderable(-1e300));
    }

    #[test]
    fn test_zset_order_and_rank() {
        let mut z = ZSet::default();
        assert!(z.insert(b"b".to_vec(), 2.0));
        assert!(z.insert(b"a".to_vec(), 2.0));
        assert!(z.insert(b"c".to_vec(), -1.0));
        assert!(!z.insert(b"c".to_vec(), 3.0));

        let members: Vec<_> = z.iter().map(|(m, _)| m.to_vec()).collect();
        assert_eq!(members, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
        assert_eq!(z.rank(b"c"), Some(2));
        assert_eq!(z.score(b"c"), Some(3.0));
        assert!(z.remove(b"a"));
        assert_eq!(z.rank(b"b"), Some(0));
    }

    #[test]
    fn test_negative_zero_ties_with_zero() {
        assert_eq!(orderable(-0.0), orderable(0.0));
        let mut z = ZSet::default();
        z.insert(b"b".to_vec(), 0.0);
        z.insert(b"a".to_vec(), -0.0);
        z.insert(b"c".to_vec(), -0.0);
        let members: Vec<_> = z.iter().map(|(m, _)| m.to_vec()).collect();
        assert_eq!(members, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
        assert_eq!(z.rank(b"c"), Some(2));
        assert!(z.score(b"a").unwrap().is_sign_positive());
        let zero = Bound::parse(b"0").unwrap();
        assert_eq!(z.in_range(zero, zero).len(), 3);
    }

    #[test]
    fn test_score_bounds() {
        let mut z = ZSet::default();
        for (m, s) in [("a", 1.0), ("b", 2.0), ("c", 3.0)] {
            z.insert(m.as_bytes().to_vec(), s);
        }
        let min = Bound::parse(b"(1").unwrap();
        let max = Bound::parse(b"+inf").unwrap();
        assert_eq!(z.in_range(min, max).len(), 2);
        assert!(Bound::parse(b"nope").is_none());
    }

    #[test]
    fn test_clamp_range() {
        assert_eq!(clamp_range(0, -1, 3), Some((0, 2)));
        assert_eq!(clamp_range(-2, -1, 3), Some((1, 2)));
        assert_eq!(clamp_range(1, 100, 3), Some((1, 2)));
        assert_eq!(clamp_range(5, 10, 3), None);
        assert_eq!(clamp_range(0, -1, 0), None);
        assert_eq!(clamp_range(2, 1, 3), None);
    }
}
