//! [`Owner`] read model definition.

use crate::domain::Owner;

/// [`Owner`] along with the aggregates shown in the admin list.
#[derive(Clone, Debug)]
pub struct Summary {
    /// The [`Owner`] itself.
    pub owner: Owner,

    /// Number of [`Property`]s controlled by the [`Owner`].
    ///
    /// [`Property`]: crate::domain::Property
    pub properties_count: i64,
}
