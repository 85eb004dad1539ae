//! [`Background`] environment running [`Task`]s on the current thread.

use std::{
    error::Error as StdError,
    future::{Future, IntoFuture},
    iter,
};

use derive_more::{Display, Error};
use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tokio::task;

#[cfg(doc)]
use crate::Task;

/// Type-erased error of a [`Task`].
type BoxedError = Box<dyn StdError + 'static>;

/// Background environment for running [`Task`]s.
///
/// Resolves once all the spawned [`Task`]s finish, or with the [`Failure`]
/// of the first one stopped abnormally.
#[derive(Debug, Default)]
pub struct Background {
    /// Local set of tasks.
    set: task::LocalSet,

    /// Names and handles of the spawned tasks.
    tasks: Vec<(&'static str, task::JoinHandle<Result<(), BoxedError>>)>,
}

impl Background {
    /// Spawns a new [`Task`] under the provided `name`.
    pub fn spawn<F, E>(&mut self, name: &'static str, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: StdError + 'static,
    {
        let handle = self
            .set
            .spawn_local(future.map_err(|e| BoxedError::from(Box::new(e))));
        self.tasks.push((name, handle));
    }
}

impl IntoFuture for Background {
    type Output = Result<(), Failure>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { set, tasks } = self;
        let tasks = tasks.into_iter().map(|(name, handle)| {
            handle
                .map(move |res| match res {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(source)) => Err(Failure::Failed { name, source }),
                    Err(source) => Err(Failure::Aborted { name, source }),
                })
                .boxed_local()
        });
        future::try_join_all(iter::once(set.map(Ok).boxed_local()).chain(tasks))
            .map_ok(drop)
            .boxed_local()
    }
}

/// Abnormal stop of a [`Task`] running in a [`Background`].
#[derive(Debug, Display, Error)]
pub enum Failure {
    /// [`Task`] returned an error.
    #[display("`{name}` task failed: {source}")]
    Failed {
        /// Name of the failed [`Task`].
        name: &'static str,

        /// Error the [`Task`] failed with.
        #[error(not(source))]
        source: BoxedError,
    },

    /// [`Task`] panicked or was cancelled.
    #[display("`{name}` task aborted: {source}")]
    Aborted {
        /// Name of the aborted [`Task`].
        name: &'static str,

        /// Reason of the abort.
        source: task::JoinError,
    },
}

impl Failure {
    /// Returns the name of the stopped [`Task`].
    #[must_use]
    pub const fn task(&self) -> &'static str {
        match self {
            Self::Failed { name, .. } | Self::Aborted { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::io;

    use super::Background;

    #[tokio::test]
    async fn completes_when_every_task_completes() {
        let mut bg = Background::default();
        bg.spawn("first", async { Ok::<_, io::Error>(()) });
        bg.spawn("second", async { Ok::<_, io::Error>(()) });

        bg.await.unwrap();
    }

    #[tokio::test]
    async fn names_failed_task() {
        let mut bg = Background::default();
        bg.spawn("healthy", async { Ok::<_, io::Error>(()) });
        bg.spawn("broken", async {
            Err(io::Error::other("disk is gone"))
        });

        let failure = bg.await.unwrap_err();

        assert_eq!(failure.task(), "broken");
        assert_eq!(
            failure.to_string(),
            "`broken` task failed: disk is gone",
        );
    }
}
