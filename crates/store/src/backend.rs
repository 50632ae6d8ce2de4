use crate::StoreError;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Raw key-value storage underneath the typed record layer.
///
/// Implementations provide per-key atomicity and nothing more; the record
/// layer owns encoding, bucket maintenance, and result ordering.
pub trait StoreBackend: Send + Sync {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
    fn batch_put(&self, entries: Vec<(String, Vec<u8>)>) -> Result<(), StoreError>;
    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError>;
    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn StoreBackend")
    }
}

/// Which backend a store opens, and where.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    #[default]
    InMemory,
    RocksDb {
        path: String,
    },
}

impl BackendConfig {
    pub fn in_memory() -> Self {
        BackendConfig::InMemory
    }

    pub fn rocksdb<P: Into<String>>(path: P) -> Self {
        BackendConfig::RocksDb { path: path.into() }
    }

    pub fn build(&self) -> Result<Box<dyn StoreBackend>, StoreError> {
        match self {
            BackendConfig::InMemory => Ok(Box::new(InMemoryBackend::new())),
            BackendConfig::RocksDb { path } => {
                #[cfg(feature = "backend-rocksdb")]
                {
                    Ok(Box::new(RocksDbBackend::open(path)?))
                }
                #[cfg(not(feature = "backend-rocksdb"))]
                {
                    let _ = path;
                    Err(StoreError::backend(
                        "rocksdb backend disabled at compile time",
                    ))
                }
            }
        }
    }
}

/// Map-backed store for tests, demos, and single-process deployments.
pub struct InMemoryBackend {
    records: RwLock<hashbrown::HashMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(hashbrown::HashMap::new()),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBackend for InMemoryBackend {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let guard = self
            .records
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.records
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .remove(key);
        Ok(())
    }

    fn batch_put(&self, entries: Vec<(String, Vec<u8>)>) -> Result<(), StoreError> {
        let mut guard = self
            .records
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        for (key, value) in entries {
            guard.insert(key, value);
        }
        Ok(())
    }

    fn scan(
        &self,
        visitor: &mut dyn FnMut(&[u8]) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let guard = self
            .records
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        for value in guard.values() {
            visitor(value)?;
        }
        Ok(())
    }
}

#[cfg(feature = "backend-rocksdb")]
mod rocksdb_backend {
    use super::StoreBackend;
    use crate::StoreError;
    use rocksdb::{IteratorMode, Options, WriteBatch, DB};

    pub struct RocksDbBackend {
        db: DB,
    }

    impl RocksDbBackend {
        pub fn open(path: &str) -> Result<Self, StoreError> {
            let mut opts = Options::default();
            opts.create_if_missing(true);
            let db = DB::open(&opts, path).map_err(StoreError::backend)?;
            Ok(Self { db })
        }
    }

    impl StoreBackend for RocksDbBackend {
        fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
            self.db.put(key, value).map_err(StoreError::backend)
        }

        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.db.get(key).map_err(StoreError::backend)
        }

        fn delete(&self, key: &str) -> Result<(), StoreError> {
            self.db.delete(key).map_err(StoreError::backend)
        }

        fn batch_put(&self, entries: Vec<(String, Vec<u8>)>) -> Result<(), StoreError> {
            let mut batch = WriteBatch::default();
            for (key, value) in entries {
                batch.put(key, value);
            }
            self.db.write(batch).map_err(StoreError::backend)
        }

        fn scan(
            &self,
            visitor: &mut dyn FnMut(&[u8]) -> Result<(), StoreError>,
        ) -> Result<(), StoreError> {
            for item in self.db.iterator(IteratorMode::Start) {
                let (_, value) = item.map_err(StoreError::backend)?;
                visitor(&value)?;
            }
            Ok(())
        }

        fn flush(&self) -> Result<(), StoreError> {
            self.db.flush().map_err(StoreError::backend)
        }
    }
}

#[cfg(feature = "backend-rocksdb")]
pub use rocksdb_backend::RocksDbBackend;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_round_trip() {
        let backend = InMemoryBackend::new();
        backend.put("a", b"alpha").expect("put");
        assert_eq!(backend.get("a").expect("get"), Some(b"alpha".to_vec()));
        backend.delete("a").expect("delete");
        assert_eq!(backend.get("a").expect("get"), None);
    }

    #[test]
    fn batch_put_inserts_every_entry() {
        let backend = InMemoryBackend::new();
        backend
            .batch_put(vec![
                ("a".to_string(), vec![1]),
                ("b".to_string(), vec![2]),
            ])
            .expect("batch");
        assert_eq!(backend.get("a").expect("get"), Some(vec![1]));
        assert_eq!(backend.get("b").expect("get"), Some(vec![2]));
    }

    #[test]
    fn scan_visits_every_value() {
        let backend = InMemoryBackend::new();
        backend.put("a", &[1]).expect("put");
        backend.put("b", &[2]).expect("put");
        let mut seen = Vec::new();
        backend
            .scan(&mut |value| {
                seen.push(value.to_vec());
                Ok(())
            })
            .expect("scan");
        seen.sort();
        assert_eq!(seen, vec![vec![1], vec![2]]);
    }

    #[test]
    fn default_config_builds_an_in_memory_backend() {
        let backend = BackendConfig::default().build().expect("build");
        backend.put("k", b"v").expect("put");
        assert_eq!(backend.get("k").expect("get"), Some(b"v".to_vec()));
    }

    #[cfg(not(feature = "backend-rocksdb"))]
    #[test]
    fn rocksdb_config_errors_when_feature_is_off() {
        let err = BackendConfig::rocksdb("/tmp/never-used").build().unwrap_err();
        assert!(err.to_string().contains("disabled at compile time"));
    }
}

#[cfg(all(test, feature = "backend-rocksdb"))]
mod rocksdb_tests {
    use super::*;

    #[test]
    fn rocksdb_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = BackendConfig::rocksdb(dir.path().to_string_lossy().to_string())
            .build()
            .expect("open");
        backend.put("a", b"alpha").expect("put");
        assert_eq!(backend.get("a").expect("get"), Some(b"alpha".to_vec()));
        backend.flush().expect("flush");
        let mut count = 0;
        backend
            .scan(&mut |_| {
                count += 1;
                Ok(())
            })
            .expect("scan");
        assert_eq!(count, 1);
    }
}
