use dashmap::DashMap;
use rotor_dns_domain::RecordType;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockKey = (Arc<str>, RecordType);

/// One async lock per stored record, so concurrent queries for the same name
/// and type read, rotate and write back one after another.
///
/// Entries are dropped as soon as nobody holds or waits on them.
#[derive(Default)]
pub(crate) struct RecordLocks {
    locks: DashMap<LockKey, Arc<Mutex<()>>>,
}

pub(crate) struct RecordLockGuard<'a> {
    locks: &'a DashMap<LockKey, Arc<Mutex<()>>>,
    key: LockKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl RecordLocks {
    pub(crate) async fn acquire(
        &self,
        name: &Arc<str>,
        record_type: RecordType,
    ) -> RecordLockGuard<'_> {
        let key = (name.clone(), record_type);
        let lock = self.locks.entry(key.clone()).or_default().clone();

        RecordLockGuard {
            locks: &self.locks,
            key,
            guard: Some(lock.lock_owned().await),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

impl Drop for RecordLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_released_lock_is_forgotten() {
        let locks = RecordLocks::default();
        let name: Arc<str> = Arc::from("web.rotor.example");

        {
            let _guard = locks.acquire(&name, RecordType::A).await;
            assert_eq!(locks.len(), 1);
        }
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_same_key_is_exclusive_other_keys_are_not() {
        let locks = Arc::new(RecordLocks::default());
        let name: Arc<str> = Arc::from("web.rotor.example");

        let guard = locks.acquire(&name, RecordType::A).await;
        let _other = locks.acquire(&name, RecordType::TXT).await;

        let waiter = {
            let locks = locks.clone();
            let name = name.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&name, RecordType::A).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
