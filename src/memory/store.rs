use super::glob::glob_match;
use super::types::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// A stored value plus its optional deadline.
#[derive(Debug, Clone)]
pub struct Entry {
    pub value: Value,
    pub expires_at: Option<Instant>,
}

impl Entry {
    pub fn new(value: Value) -> Self {
        Entry {
            value,
            expires_at: None,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// One logical database. Expired keys are dropped lazily on access.
#[derive(Debug, Default)]
pub struct Keyspace {
    data: HashMap<String, Entry>,
}

impl Keyspace {
    fn purge_if_expired(&mut self, key: &str) {
        if self
            .data
            .get(key)
            .is_some_and(|entry| entry.is_expired(Instant::now()))
        {
            self.data.remove(key);
        }
    }

    pub fn get(&mut self, key: &str) -> Option<&Entry> {
        self.purge_if_expired(key);
        self.data.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.purge_if_expired(key);
        self.data.get_mut(key)
    }

    /// Get the value at `key`, inserting `make()` if the key is absent.
    pub fn get_or_insert(&mut self, key: &str, make: fn() -> Value) -> &mut Value {
        self.purge_if_expired(key);
        &mut self
            .data
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(make()))
            .value
    }

    /// Store a value, dropping any previous TTL.
    pub fn set(&mut self, key: &str, value: Value) {
        self.data.insert(key.to_string(), Entry::new(value));
    }

    pub fn set_entry(&mut self, key: &str, entry: Entry) {
        self.data.insert(key.to_string(), entry);
    }

    pub fn del(&mut self, key: &str) -> bool {
        self.purge_if_expired(key);
        self.data.remove(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.purge_if_expired(key);
        self.data.remove(key)
    }

    pub fn exists(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove `key` if it holds an aggregate that has become empty.
    pub fn prune(&mut self, key: &str) {
        if self
            .data
            .get(key)
            .is_some_and(|entry| entry.value.is_empty_aggregate())
        {
            self.data.remove(key);
        }
    }

    pub fn expire_in(&mut self, key: &str, ttl: Duration) -> bool {
        match self.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(Instant::now() + ttl);
                true
            }
            None => false,
        }
    }

    /// Milliseconds left, `-1` without expiry, `-2` if the key is absent.
    pub fn pttl(&mut self, key: &str) -> i64 {
        match self.get(key) {
            None => -2,
            Some(Entry {
                expires_at: None, ..
            }) => -1,
            Some(Entry {
                expires_at: Some(deadline),
                ..
            }) => deadline
                .saturating_duration_since(Instant::now())
                .as_millis() as i64,
        }
    }

    /// Live keys matching a glob pattern, sorted.
    pub fn keys(&self, pattern: &str) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .data
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .filter(|(key, _)| glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_lazy_expiry() {
        let mut ks = Keyspace::default();
        ks.set("a", Value::Str(b"1".to_vec()));
        assert_eq!(ks.pttl("a"), -1);
        assert!(ks.expire_in("a", Duration::from_millis(50)));
        assert_eq!(ks.pttl("a"), 50);

        tokio::time::advance(Duration::from_millis(50)).await;
        assert!(!ks.exists("a"));
        assert_eq!(ks.pttl("a"), -2);
        assert!(!ks.expire_in("a", Duration::from_secs(1)));
    }

    #[test]
    fn test_keys_and_prune() {
        let mut ks = Keyspace::default();
        ks.set("Brewery:frmt:name", Value::Str(b"Fremont".to_vec()));
        ks.set("Brewery:frmt:beers", Value::Set(Default::default()));
        ks.set("Beer:1:name", Value::Str(b"Interurban".to_vec()));

        assert_eq!(
            ks.keys("Brewery:*"),
            vec!["Brewery:frmt:beers", "Brewery:frmt:name"]
        );
        ks.prune("Brewery:frmt:beers");
        ks.prune("Brewery:frmt:name");
        assert_eq!(ks.keys("*"), vec!["Beer:1:name", "Brewery:frmt:name"]);
    }
}
