mod access;
pub mod audit;
pub mod bulk;
pub mod company;
pub mod csv;
mod de;
pub mod employee;
mod error;
mod page;
mod session;
pub mod user;

pub use access::{Action, Profile, ProfileUser, Resource, Role};
pub use error::{Error, Result, extract_message};
pub use page::{Page, QueryPairs};
pub use session::{LoginNotice, RefreshedAccess, SESSION_COOKIE_NAME, TokenPair};

#[doc(hidden)]
pub use anyhow::anyhow as internal_anyhow_dont_use;

/// Build an [`Error::Other`] from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::Other($crate::internal_anyhow_dont_use!($($arg)*))
    };
}
