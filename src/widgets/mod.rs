//! Small pieces shared by several pages.

pub mod avatar;
pub mod like_list;
pub mod notifications;

pub use avatar::{initials, Avatar};
pub use like_list::LikeList;
pub use notifications::NotificationBell;
