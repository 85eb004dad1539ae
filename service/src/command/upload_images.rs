//! [`Command`] for uploading a batch of [`Image`]s.

use common::operations::{By, Delete, Insert};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{image, Image},
    infra::{storage, Storage},
    Service,
};

use super::Command;

/// Configuration of [`UploadImages`] [`Command`].
#[derive(Clone, Debug)]
pub struct Config {
    /// Public URL the stored images are served under.
    pub public_url: String,

    /// Maximum size of a single decoded image, in bytes.
    pub max_size: usize,
}

/// [`Command`] for uploading a batch of [`Image`]s all-or-nothing.
///
/// Every [`Upload`] is decoded before anything is written. If any write
/// fails, the files written by this batch are removed again.
#[derive(Clone, Debug, From)]
pub struct UploadImages {
    /// [`Upload`]s of the batch, in order.
    pub uploads: Vec<Upload>,
}

/// Single file uploaded by a client.
#[derive(Clone, Debug)]
pub struct Upload {
    /// Name of the file on the client side, if provided.
    pub file_name: Option<String>,

    /// [Base64]-encoded contents, optionally prefixed as a data URL.
    ///
    /// [Base64]: https://datatracker.ietf.org/doc/html/rfc4648
    pub data: String,
}

/// [`Image`] stored by [`UploadImages`] [`Command`].
#[derive(Clone, Debug)]
pub struct Uploaded {
    /// [`image::FileName`] in the [`Storage`].
    pub name: image::FileName,

    /// Public [`image::Url`] of the stored [`Image`].
    pub url: image::Url,
}

impl<Db, St, Ms> Command<UploadImages> for Service<Db, St, Ms>
where
    St: Storage<Insert<Image>, Ok = bool, Err = Traced<storage::Error>>
        + Storage<
            Delete<By<Image, image::FileName>>,
            Ok = (),
            Err = Traced<storage::Error>,
        >,
{
    type Ok = Vec<Uploaded>;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UploadImages,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let config = &self.config.upload_images;

        if cmd.uploads.is_empty() {
            return Err(tracerr::new!(E::NoFile));
        }
        let images = cmd
            .uploads
            .into_iter()
            .enumerate()
            .map(|(index, upload)| {
                let file_name = upload
                    .file_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .unwrap_or(image::DEFAULT_UPLOAD_NAME);
                let image = Image::decode(file_name, &upload.data)
                    .map_err(|e| match e {
                        image::DecodeError::Empty => E::NoFile,
                        image::DecodeError::Base64(_) => {
                            E::InvalidData { index, source: e }
                        }
                    })
                    .map_err(tracerr::wrap!())?;
                if image.content.len() > config.max_size {
                    return Err(tracerr::new!(E::TooLarge {
                        index,
                        max_size: config.max_size,
                    }));
                }
                Ok(image)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut written = Vec::with_capacity(images.len());
        let mut uploaded = Vec::with_capacity(images.len());
        for image in images {
            let name = image.name.clone();
            match self.storage().execute(Insert(image)).await {
                Ok(is_new) => {
                    if is_new {
                        written.push(name.clone());
                    }
                    uploaded.push(Uploaded {
                        url: image::Url::of_stored(&config.public_url, &name),
                        name,
                    });
                }
                Err(e) => {
                    self.discard(written).await;
                    return Err(tracerr::map_from_and_wrap!(=> E)(e));
                }
            }
        }

        Ok(uploaded)
    }
}

impl<Db, St, Ms> Service<Db, St, Ms>
where
    St: Storage<
        Delete<By<Image, image::FileName>>,
        Ok = (),
        Err = Traced<storage::Error>,
    >,
{
    /// Removes the files written by a failed [`UploadImages`] batch.
    ///
    /// Leftovers are reported and later collected by the
    /// [`CleanOrphanedImages`] task.
    ///
    /// Names are content-addressed, so a concurrent batch uploading the same
    /// bytes may have been handed a file removed here.
    ///
    /// [`CleanOrphanedImages`]: crate::task::CleanOrphanedImages
    async fn discard(&self, written: Vec<image::FileName>) {
        for name in written {
            if let Err(e) = self.storage().execute(Delete(By::new(name))).await
            {
                log::error!("failed to discard uploaded image: {e}");
            }
        }
    }
}

/// Error of [`UploadImages`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),

    /// No file data provided.
    #[display("No file provided")]
    NoFile,

    /// File data is malformed.
    #[display("File #{index} is malformed: {source}")]
    #[from(ignore)]
    InvalidData {
        /// Position of the file in the batch.
        index: usize,

        /// [`image::DecodeError`] of the file.
        source: image::DecodeError,
    },

    /// File exceeds the size limit.
    #[display("File #{index} exceeds {max_size} bytes")]
    #[from(ignore)]
    TooLarge {
        /// Position of the file in the batch.
        index: usize,

        /// Maximum allowed size of a file, in bytes.
        max_size: usize,
    },
}

#[cfg(test)]
mod spec {
    use base64::Engine as _;

    use crate::{Command as _, Service};

    use super::{ExecutionError, Upload, UploadImages};

    fn upload(name: &str, content: &[u8]) -> Upload {
        Upload {
            file_name: Some(name.into()),
            data: format!(
                "data:image/png;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(content),
            ),
        }
    }

    #[tokio::test]
    async fn stores_batch_in_order() {
        let svc = Service::in_memory();

        let uploaded = svc
            .execute(UploadImages::from(vec![
                upload("a.png", b"first"),
                upload("b.webp", b"second"),
            ]))
            .await
            .unwrap();

        assert_eq!(uploaded.len(), 2);
        assert!(uploaded[0].name.to_string().ends_with(".png"));
        assert!(uploaded[1].name.to_string().ends_with(".webp"));
        assert_eq!(
            uploaded[0].url.to_string(),
            format!("/images/{}", uploaded[0].name),
        );
        assert!(svc.storage().contains(&uploaded[1].name));
    }

    #[tokio::test]
    async fn same_content_yields_same_url() {
        let svc = Service::in_memory();

        let first = svc
            .execute(UploadImages::from(vec![upload("a.png", b"same")]))
            .await
            .unwrap();
        let second = svc
            .execute(UploadImages::from(vec![upload("b.png", b"same")]))
            .await
            .unwrap();

        assert_eq!(first[0].url, second[0].url);
        assert_eq!(svc.storage().len(), 1);
    }

    #[tokio::test]
    async fn failed_third_write_leaves_no_files() {
        let svc = Service::in_memory();
        svc.storage().fail_on_write(3);

        let err = svc
            .execute(UploadImages::from(vec![
                upload("a.png", b"1"),
                upload("b.png", b"2"),
                upload("c.png", b"3"),
                upload("d.png", b"4"),
            ]))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Storage(_)));
        assert_eq!(svc.storage().len(), 0);
    }

    #[tokio::test]
    async fn rollback_keeps_previously_stored_files() {
        let svc = Service::in_memory();
        let existing = svc
            .execute(UploadImages::from(vec![upload("a.png", b"kept")]))
            .await
            .unwrap();
        svc.storage().fail_on_write(2);

        drop(
            svc.execute(UploadImages::from(vec![
                upload("a.png", b"kept"),
                upload("b.png", b"lost"),
            ]))
            .await
            .unwrap_err(),
        );

        assert!(svc.storage().contains(&existing[0].name));
        assert_eq!(svc.storage().len(), 1);
    }

    #[tokio::test]
    async fn validates_everything_before_writing() {
        let svc = Service::in_memory();

        let too_large = svc
            .execute(UploadImages::from(vec![
                upload("a.png", b"small"),
                upload("b.png", &[0; 2048]),
            ]))
            .await
            .unwrap_err();
        let empty = svc
            .execute(UploadImages::from(vec![Upload {
                file_name: None,
                data: "data:image/jpeg;base64,".into(),
            }]))
            .await
            .unwrap_err();
        let malformed = svc
            .execute(UploadImages::from(vec![Upload {
                file_name: None,
                data: "@@@".into(),
            }]))
            .await
            .unwrap_err();

        assert!(matches!(
            too_large.as_ref(),
            ExecutionError::TooLarge { index: 1, .. },
        ));
        assert!(matches!(empty.as_ref(), ExecutionError::NoFile));
        assert!(matches!(
            malformed.as_ref(),
            ExecutionError::InvalidData { index: 0, .. },
        ));
        assert_eq!(svc.storage().len(), 0);
    }
}
