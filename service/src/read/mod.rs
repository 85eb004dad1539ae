//! Read entities definitions.

pub mod catalog;
pub mod dashboard;
pub mod owner;
pub mod property;

pub use self::dashboard::Dashboard;
