//! WebDriver plumbing for Sidechat.
//!
//! [`driver::SidechatDriver`] owns the browser session; [`dom::PageDom`] is
//! the seam the per-site adapters talk through, so everything above this
//! crate can run against a fixture DOM in tests.

pub mod dom;
pub mod driver;
pub mod typing;

pub use dom::{PageDom, WebDriverDom};
pub use driver::SidechatDriver;
