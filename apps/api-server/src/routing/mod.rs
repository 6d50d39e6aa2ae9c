//! Request routing: host dispatch and resource route generation.

mod hosts;
mod router;

pub use hosts::{HostRouting, HostTable, Site, SiteGuard};
pub use router::{Capabilities, ResourceHandler, ResourceRouter, method_not_allowed, resources};
