//! In-memory [`Storage`] for tests.

use std::{
    collections::HashMap,
    io,
    sync::{Arc, Mutex, MutexGuard},
};

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{image, Image},
    infra::{storage, Storage},
};

/// In-memory [`Storage`] able to fail on demand.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<Mutex<State>>);

/// State of a [`Memory`] storage.
#[derive(Debug, Default)]
struct State {
    /// Stored files.
    files: HashMap<image::FileName, (Vec<u8>, image::ModificationDateTime)>,

    /// Number of attempted writes.
    writes: usize,

    /// Ordinal number of the write to fail, if any.
    failing_write: Option<usize>,
}

impl Memory {
    /// Makes the `n`th (1-based) write from now on fail.
    pub fn fail_on_write(&self, n: usize) {
        let mut state = self.state();
        state.failing_write = Some(state.writes + n);
    }

    /// Puts the provided [`Image`] as if it was written at the given moment.
    pub fn put(&self, image: Image, modified_at: image::ModificationDateTime) {
        let mut state = self.state();
        drop(state.files.insert(image.name, (image.content, modified_at)));
    }

    /// Indicates whether a file with the provided name is stored.
    #[must_use]
    pub fn contains(&self, name: &image::FileName) -> bool {
        self.state().files.contains_key(name)
    }

    /// Returns the number of the stored files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().files.len()
    }

    /// Locks the [`State`] of this [`Memory`] storage.
    fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().expect("not poisoned")
    }
}

impl Storage<Insert<Image>> for Memory {
    type Ok = bool;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(image): Insert<Image>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        state.writes += 1;
        if state.failing_write == Some(state.writes) {
            return Err(tracerr::new!(storage::Error::Io(io::Error::other(
                "disk is full",
            ))));
        }
        if state.files.contains_key(&image.name) {
            return Ok(false);
        }
        drop(state.files.insert(
            image.name,
            (image.content, image::ModificationDateTime::now()),
        ));
        Ok(true)
    }
}

impl Storage<Delete<By<Image, image::FileName>>> for Memory {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Image, image::FileName>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().files.remove(&by.into_inner()));
        Ok(())
    }
}

impl Storage<Select<By<Vec<image::Stored>, ()>>> for Memory {
    type Ok = Vec<image::Stored>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<image::Stored>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .state()
            .files
            .iter()
            .map(|(name, (_, modified_at))| image::Stored {
                name: name.clone(),
                modified_at: *modified_at,
            })
            .collect())
    }
}
