//! Background [`Task`]s definitions.

pub mod background;
pub mod clean_orphaned_images;

pub use common::Handler as Task;

pub use self::{
    background::Background, clean_orphaned_images::CleanOrphanedImages,
};
