//! [`Storage`] keeping images in a local directory.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use common::operations::{By, Delete, Insert, Select};
use tokio::fs;
use tracerr::Traced;

use crate::{
    domain::{image, Image},
    infra::{storage, Storage},
};

/// [`Storage`] keeping images as files in a local directory.
#[derive(Clone, Debug)]
pub struct LocalFs {
    /// Directory the files are kept in.
    root: Arc<PathBuf>,
}

impl LocalFs {
    /// Opens a [`LocalFs`] in the provided `root` directory, creating it if
    /// missing.
    ///
    /// # Errors
    ///
    /// If the `root` directory cannot be created.
    pub async fn open(
        root: impl Into<PathBuf>,
    ) -> Result<Self, Traced<storage::Error>> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))?;
        Ok(Self {
            root: Arc::new(root),
        })
    }

    /// Returns the directory the files are kept in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of the file with the provided [`image::FileName`].
    fn path(&self, name: &image::FileName) -> PathBuf {
        self.root.join(name.as_ref())
    }
}

impl Storage<Insert<Image>> for LocalFs {
    /// Indicator whether the file has been written rather than found.
    type Ok = bool;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Insert(image): Insert<Image>,
    ) -> Result<Self::Ok, Self::Err> {
        let path = self.path(&image.name);
        // Names are content-addressed, so an existing file is the same image.
        if fs::try_exists(&path)
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))?
        {
            return Ok(false);
        }

        let tmp = path.with_extension("part");
        fs::write(&tmp, &image.content)
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))?;
        Ok(true)
    }
}

impl Storage<Delete<By<Image, image::FileName>>> for LocalFs {
    type Ok = ();
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Image, image::FileName>>,
    ) -> Result<Self::Ok, Self::Err> {
        match fs::remove_file(self.path(&by.into_inner())).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                Err(tracerr::new!(storage::Error::Io(e)))
            }
            Ok(()) | Err(_) => Ok(()),
        }
    }
}

impl Storage<Select<By<Vec<image::Stored>, ()>>> for LocalFs {
    type Ok = Vec<image::Stored>;
    type Err = Traced<storage::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<image::Stored>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut dir = fs::read_dir(self.root())
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))?;

        let mut stored = vec![];
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(tracerr::from_and_wrap!(=> storage::Error))?
        {
            // Foreign and partially written files are not ours to manage.
            let Some(name) = entry
                .file_name()
                .to_str()
                .and_then(|n| n.parse::<image::FileName>().ok())
            else {
                continue;
            };

            let modified = entry
                .metadata()
                .await
                .and_then(|m| m.modified())
                .map_err(tracerr::from_and_wrap!(=> storage::Error))?;
            let Ok(modified_at) =
                image::ModificationDateTime::try_from(modified)
            else {
                continue;
            };

            stored.push(image::Stored { name, modified_at });
        }
        Ok(stored)
    }
}

#[cfg(test)]
mod spec {
    use common::operations::{By, Delete, Insert, Select};

    use crate::{
        domain::{image, Image},
        infra::Storage as _,
    };

    use super::LocalFs;

    #[tokio::test]
    async fn stores_lists_and_deletes_images() {
        let root = std::env::temp_dir()
            .join(format!("local-fs-spec-{}", std::process::id()));
        let storage = LocalFs::open(&root).await.unwrap();
        let image = Image::new(image::Format::Png, b"png".to_vec());

        assert!(storage.execute(Insert(image.clone())).await.unwrap());
        assert!(!storage.execute(Insert(image.clone())).await.unwrap());
        tokio::fs::write(root.join("notes.txt"), b"foreign").await.unwrap();

        let stored = storage
            .execute(Select(By::<Vec<image::Stored>, _>::new(())))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, image.name);

        storage
            .execute(Delete(By::<Image, _>::new(image.name.clone())))
            .await
            .unwrap();
        storage
            .execute(Delete(By::<Image, _>::new(image.name.clone())))
            .await
            .unwrap();
        assert!(!root.join(image.name.as_ref()).exists());

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
