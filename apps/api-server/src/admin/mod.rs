//! Operator-facing admin site.

mod site;
pub mod views;

pub use site::{AdminSite, build_admin_site};
