//! Admin account registration and stateless credential checks.
//! No session or token is issued; the caller owns its session mechanism.

pub mod admin;
pub mod handlers;
pub mod password;
