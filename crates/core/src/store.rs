//! Local replica of the server-side collection
//!
//! Single writer (the session), many concurrent readers. Snapshots arrive
//! as full replacement images, never diffs: a replacement swaps one
//! refcounted map for another, so a reader holds either the fully-old or
//! fully-new image and never a mix.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::types::Record;

/// Shared, atomically replaceable id → record mapping (ordered by id)
#[derive(Debug, Clone, Default)]
pub struct CollectionStore {
    // Lock is held only for the Arc swap/clone, never across await points.
    inner: Arc<RwLock<Arc<BTreeMap<i64, Record>>>>,
}

impl CollectionStore {
    pub fn new(initial: BTreeMap<i64, Record>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// Replace the entire replica with a new snapshot. Returns the shared
    /// image so callers can hand it to subscribers without re-locking.
    pub fn replace(&self, snapshot: BTreeMap<i64, Record>) -> Arc<BTreeMap<i64, Record>> {
        let image = Arc::new(snapshot);
        let mut guard = self.inner.write().expect("collection store lock poisoned");
        *guard = image.clone();
        image
    }

    /// Current snapshot as a shared image
    pub fn snapshot(&self) -> Arc<BTreeMap<i64, Record>> {
        self.inner
            .read()
            .expect("collection store lock poisoned")
            .clone()
    }

    /// Look up one record by id
    pub fn get(&self, id: i64) -> Option<Record> {
        self.snapshot().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinates, House, Transport, View};

    fn record(id: i64, name: &str) -> Record {
        let mut record = Record::new(
            name.to_string(),
            Coordinates { x: 1.0, y: 1 },
            40.0,
            2,
            60_000.0,
            View::Yard,
            Transport::Enough,
            House {
                name: None,
                year: 1990,
                number_of_floors: 5,
                flats_per_floor: 3,
                number_of_lifts: 1,
            },
        );
        record.id = id;
        record
    }

    #[test]
    fn test_replace_supersedes_fully() {
        let mut first = BTreeMap::new();
        first.insert(1, record(1, "a"));
        first.insert(2, record(2, "b"));
        let store = CollectionStore::new(first);

        let mut second = BTreeMap::new();
        second.insert(3, record(3, "c"));
        store.replace(second);

        // No merge: keys from the first snapshot are gone
        assert!(store.get(1).is_none());
        assert!(store.get(2).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(3).unwrap().name, "c");
    }

    #[test]
    fn test_reader_keeps_old_image_across_replace() {
        let mut first = BTreeMap::new();
        first.insert(1, record(1, "a"));
        let store = CollectionStore::new(first);

        let held = store.snapshot();
        let mut second = BTreeMap::new();
        second.insert(2, record(2, "b"));
        store.replace(second);

        // The held image is the fully-old state, untouched by the swap
        assert!(held.contains_key(&1));
        assert!(!held.contains_key(&2));
        assert!(store.snapshot().contains_key(&2));
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let store = CollectionStore::default();
        let mut handles = Vec::new();

        // Writer alternates between two snapshots whose contents must
        // never be observed mixed.
        for round in 0..50u8 {
            let mut map = BTreeMap::new();
            if round % 2 == 0 {
                map.insert(1, record(1, "a"));
                map.insert(2, record(2, "a"));
            } else {
                map.insert(3, record(3, "b"));
                map.insert(4, record(4, "b"));
            }
            store.replace(map);

            let reader = store.clone();
            handles.push(std::thread::spawn(move || {
                let snap = reader.snapshot();
                let even = snap.contains_key(&1) || snap.contains_key(&2);
                let odd = snap.contains_key(&3) || snap.contains_key(&4);
                assert!(!(even && odd), "observed a mixed snapshot");
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_ordered_by_id() {
        let mut map = BTreeMap::new();
        map.insert(9, record(9, "z"));
        map.insert(1, record(1, "a"));
        map.insert(5, record(5, "m"));
        let store = CollectionStore::new(map);
        let ids: Vec<i64> = store.snapshot().keys().copied().collect();
        assert_eq!(ids, vec![1, 5, 9]);
    }
}
