//! Tenant-isolated storage of book inputs.
//!
//! The host service owns one store and passes it to whoever needs it; there is
//! no process-wide registry.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use ledgerbook_core::{BookId, DomainError, DomainResult, TenantId};

use crate::statement::BookInput;

/// create / lookup / evict over `(tenant, book)` keys.
pub trait BookStore: Send + Sync {
    /// Registers a book; fails with `Conflict` if it already exists.
    fn create(&self, tenant_id: TenantId, book_id: BookId, input: BookInput) -> DomainResult<()>;
    /// Fails with `NotFound` for unknown keys, including other tenants' books.
    fn lookup(&self, tenant_id: TenantId, book_id: BookId) -> DomainResult<Arc<BookInput>>;
    /// Removes a book, returning whether it was present.
    fn evict(&self, tenant_id: TenantId, book_id: BookId) -> bool;
    /// Book ids of one tenant.
    fn list(&self, tenant_id: TenantId) -> Vec<BookId>;
}

impl<S> BookStore for Arc<S>
where
    S: BookStore + ?Sized,
{
    fn create(&self, tenant_id: TenantId, book_id: BookId, input: BookInput) -> DomainResult<()> {
        (**self).create(tenant_id, book_id, input)
    }

    fn lookup(&self, tenant_id: TenantId, book_id: BookId) -> DomainResult<Arc<BookInput>> {
        (**self).lookup(tenant_id, book_id)
    }

    fn evict(&self, tenant_id: TenantId, book_id: BookId) -> bool {
        (**self).evict(tenant_id, book_id)
    }

    fn list(&self, tenant_id: TenantId) -> Vec<BookId> {
        (**self).list(tenant_id)
    }
}

/// In-memory store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    inner: RwLock<HashMap<(TenantId, BookId), Arc<BookInput>>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> DomainError {
    DomainError::invariant("book store lock poisoned")
}

impl BookStore for InMemoryBookStore {
    fn create(&self, tenant_id: TenantId, book_id: BookId, input: BookInput) -> DomainResult<()> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&(tenant_id, book_id)) {
            return Err(DomainError::conflict(format!("book {book_id} already exists")));
        }
        map.insert((tenant_id, book_id), Arc::new(input));
        Ok(())
    }

    fn lookup(&self, tenant_id: TenantId, book_id: BookId) -> DomainResult<Arc<BookInput>> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        map.get(&(tenant_id, book_id))
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("book {book_id}")))
    }

    fn evict(&self, tenant_id: TenantId, book_id: BookId) -> bool {
        match self.inner.write() {
            Ok(mut map) => map.remove(&(tenant_id, book_id)).is_some(),
            Err(_) => false,
        }
    }

    fn list(&self, tenant_id: TenantId) -> Vec<BookId> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };
        map.keys()
            .filter_map(|(t, b)| if *t == tenant_id { Some(*b) } else { None })
            .collect()
    }
}
