//! [`CleanOrphanedImages`] [`Task`].

use std::{collections::HashSet, convert::Infallible, error::Error, time};

use common::operations::{By, Delete, Perform, Select, Start};
use derive_more::{Display, Error as StdError, From};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{image, Image},
    infra::{database, storage, Database, Storage},
    Service,
};

use super::Task;

/// Configuration for [`CleanOrphanedImages`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between stored images cleaning.
    pub interval: time::Duration,

    /// Timeout after which an unreferenced image is considered orphaned.
    pub timeout: time::Duration,
}

/// [`Task`] for removing stored [`Image`]s no listing refers to.
#[derive(Clone, Copy, Debug)]
pub struct CleanOrphanedImages<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, St, Ms> Task<Start<By<CleanOrphanedImages<Self>, Config>>>
    for Service<Db, St, Ms>
where
    CleanOrphanedImages<Service<Db, St, Ms>>:
        Task<Perform<()>, Ok = usize, Err: Error> + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<CleanOrphanedImages<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = CleanOrphanedImages {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            match task.execute(Perform(())).await {
                Ok(0) => {}
                Ok(n) => log::info!("removed {n} orphaned images"),
                Err(e) => {
                    log::error!("`task::CleanOrphanedImages` failed: {e}");
                }
            }
        }
    }
}

impl<Db, St, Ms> Task<Perform<()>> for CleanOrphanedImages<Service<Db, St, Ms>>
where
    Db: Database<
        Select<By<HashSet<image::Url>, ()>>,
        Ok = HashSet<image::Url>,
        Err = Traced<database::Error>,
    >,
    St: Storage<
            Select<By<Vec<image::Stored>, ()>>,
            Ok = Vec<image::Stored>,
            Err = Traced<storage::Error>,
        > + Storage<
            Delete<By<Image, image::FileName>>,
            Ok = (),
            Err = Traced<storage::Error>,
        >,
{
    /// Number of the removed [`Image`]s.
    type Ok = usize;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let deadline = image::ModificationDateTime::now() - self.config.timeout;

        let stored = self
            .service
            .storage()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let urls = self
            .service
            .database()
            .execute(Select(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let referenced = urls
            .iter()
            .filter_map(|url| {
                let url: &str = url.as_ref();
                url.rsplit_once('/').map(|(_, name)| name)
            })
            .collect::<HashSet<_>>();

        let mut removed = 0;
        for file in stored {
            if file.modified_at >= deadline
                || referenced.contains(file.name.to_string().as_str())
            {
                continue;
            }
            match self
                .service
                .storage()
                .execute(Delete(By::new(file.name.clone())))
                .await
            {
                Ok(()) => removed += 1,
                Err(e) => {
                    log::warn!("failed to remove `{}` image: {e}", file.name);
                }
            }
        }
        Ok(removed)
    }
}

/// Error of [`CleanOrphanedImages`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::operations::Perform;

    use crate::{
        command::{fixture, UpdateProperty},
        domain::{image, Image},
        Command as _, Service, Task as _,
    };

    use super::CleanOrphanedImages;

    #[tokio::test]
    async fn removes_only_old_unreferenced_images() {
        let svc = Service::in_memory();
        let long_ago = image::ModificationDateTime::now()
            - Duration::from_secs(7 * 24 * 60 * 60);
        let orphan = Image::new(image::Format::Jpeg, b"orphan".to_vec());
        let used = Image::new(image::Format::Png, b"used".to_vec());
        let fresh = Image::new(image::Format::Webp, b"fresh".to_vec());
        svc.storage().put(orphan.clone(), long_ago);
        svc.storage().put(used.clone(), long_ago);
        svc.storage()
            .put(fresh.clone(), image::ModificationDateTime::now());
        let property = fixture::property(&svc).await;
        drop(
            svc.execute(UpdateProperty {
                photos: Some(vec![image::Url::of_stored(
                    &svc.config().upload_images.public_url,
                    &used.name,
                )]),
                ..UpdateProperty::new(property.id)
            })
            .await
            .unwrap(),
        );

        let task = CleanOrphanedImages {
            config: svc.config().clean_orphaned_images,
            service: svc.clone(),
        };
        let removed = task.execute(Perform(())).await.unwrap();

        assert_eq!(removed, 1);
        assert!(!svc.storage().contains(&orphan.name));
        assert!(svc.storage().contains(&used.name));
        assert!(svc.storage().contains(&fresh.name));
    }
}
