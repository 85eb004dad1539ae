//! [`Command`] definition.

/// Assigns every `$field` of the `$entity` the `$cmd` provides a value for.
macro_rules! assign {
    ($entity:ident <- $cmd:ident: $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $cmd.$field {
                $entity.$field = value;
            }
        )+
    };
}

pub mod authorize_session;
pub mod contact_property;
pub mod create_owner;
pub mod create_promotion;
pub mod create_property;
pub mod create_room;
pub mod create_session;
pub mod delete_promotion;
pub mod delete_property;
pub mod delete_room;
pub mod ensure_admin;
#[cfg(test)]
pub(crate) mod fixture;
pub mod record_property_view;
pub mod submit_brief;
pub mod toggle_property;
pub mod toggle_room;
pub mod update_owner;
pub mod update_promotion;
pub mod update_property;
pub mod update_room;
pub mod upload_images;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_session::AuthorizeSession, contact_property::ContactProperty,
    create_owner::CreateOwner, create_promotion::CreatePromotion,
    create_property::CreateProperty, create_room::CreateRoom,
    create_session::CreateSession, delete_promotion::DeletePromotion,
    delete_property::DeleteProperty, delete_room::DeleteRoom,
    ensure_admin::EnsureAdmin, record_property_view::RecordPropertyView,
    submit_brief::SubmitBrief, toggle_property::ToggleProperty,
    toggle_room::ToggleRoom, update_owner::UpdateOwner,
    update_promotion::UpdatePromotion, update_property::UpdateProperty,
    update_room::UpdateRoom, upload_images::UploadImages,
};
