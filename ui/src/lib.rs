//! Widgets shared by every page.

mod company_select;
mod error;
mod flash;
mod format;
mod latest;
mod modal;
mod table;

pub use company_select::CompanySelect;
pub use error::{error_message, force_logout, is_unauthorized};
pub use flash::{FLASH_MILLIS, Flash, FlashBanner, sleep, use_flash};
pub use format::{format_date, format_money, format_timestamp, opt_display};
pub use latest::{LatestRequest, RequestGeneration, Ticket, use_latest_request};
pub use modal::{ConfirmModal, Modal};
pub use table::{EmptyRow, LoadingRow, Pagination, StatusChip, nothing_found};
