use std::ops::Deref;

use crate::app::Result;
use crate::store::SqliteStore;

/// Keeps the store's connection open for as long as it lives.
///
/// Sessions nest: the connection is created by the first one and torn down
/// when the last one is dropped.
pub struct StoreSession<'a> {
    store: &'a SqliteStore,
}

impl<'a> StoreSession<'a> {
    pub fn new(store: &'a SqliteStore) -> Result<Self> {
        store.open()?;
        Ok(Self { store })
    }
}

impl Deref for StoreSession<'_> {
    type Target = SqliteStore;

    fn deref(&self) -> &Self::Target {
        self.store
    }
}

impl Drop for StoreSession<'_> {
    fn drop(&mut self) {
        self.store.close();
    }
}
