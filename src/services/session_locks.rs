//! Bloqueos por sesión
//!
//! Serializa las escrituras sobre una misma sesión de conducción: cada
//! operación que muta una sesión mantiene el guard durante todo el ciclo
//! leer → calcular → persistir. Sesiones distintas no se bloquean entre sí.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct SessionLocks {
    locks: Arc<RwLock<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adquirir el lock exclusivo de una sesión (FIFO entre quienes esperan)
    pub async fn acquire(&self, session_id: Uuid) -> OwnedMutexGuard<()> {
        let existing = self.locks.read().await.get(&session_id).cloned();
        let lock = match existing {
            Some(lock) => lock,
            None => self
                .locks
                .write()
                .await
                .entry(session_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone(),
        };
        lock.lock_owned().await
    }

    /// Olvidar el lock de una sesión si nadie lo tiene ni lo espera.
    ///
    /// Se llama después de soltar el guard; una entrada solo referenciada por
    /// el mapa se elimina y se vuelve a crear en el próximo `acquire`.
    pub async fn evict_idle(&self, session_id: Uuid) {
        let mut locks = self.locks.write().await;
        if locks
            .get(&session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&session_id);
        }
    }

    pub async fn len(&self) -> usize {
        self.locks.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_session_is_serialized() {
        let locks = SessionLocks::new();
        let id = Uuid::new_v4();

        let guard = locks.acquire(id).await;
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_different_sessions_do_not_block() {
        let locks = SessionLocks::new();
        let _a = locks.acquire(Uuid::new_v4()).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(Uuid::new_v4())).await;
        assert!(b.is_ok());
        assert_eq!(locks.len().await, 2);
    }

    #[tokio::test]
    async fn test_evict_idle_forgets_unused_lock() {
        let locks = SessionLocks::new();
        let id = Uuid::new_v4();
        drop(locks.acquire(id).await);
        locks.evict_idle(id).await;
        assert_eq!(locks.len().await, 0);
    }

    #[tokio::test]
    async fn test_evict_idle_keeps_held_lock() {
        let locks = SessionLocks::new();
        let id = Uuid::new_v4();
        let guard = locks.acquire(id).await;
        locks.evict_idle(id).await;
        assert_eq!(locks.len().await, 1);

        // Quien espera sigue serializado con el dueño actual
        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
        locks.evict_idle(id).await;
        assert_eq!(locks.len().await, 0);
    }
}
