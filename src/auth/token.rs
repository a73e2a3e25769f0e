//! Token secrets, pairs, expiry decoding, session records, and their projection.

pub mod claims;
pub mod pair;
pub mod record;
pub mod secret;
pub mod view;
