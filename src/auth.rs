//! Auth-domain identifiers, roles, and session token models.

pub mod id;
pub mod role;
pub mod token;

pub use id::*;
pub use role::*;
pub use token::{claims::*, pair::*, record::*, secret::*, view::*};
