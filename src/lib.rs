//! Server side observe relations for CoAP.
//!
//! The [`ObserveManager`] registers an [`ObserveRelation`] per observe
//! registration; the relation orders, coalesces and type-checks the
//! notifications of the observed resource until it is canceled.
//! [`NotificationOrder`] implements the freshness test for received
//! notifications.

mod config;
mod constants;
mod errors;
pub mod message;
mod metrics;
mod observe;
pub mod utils;

pub use self::config::*;
pub use constants::OBSERVE_CANCEL;
pub use constants::OBSERVE_REGISTER;
pub use errors::*;
pub use message::KeyToken;
pub use metrics::*;
pub use observe::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
