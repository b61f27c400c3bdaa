//! Cache collaborator.
//!
//! - [`Cache`] is the port used by services.
//! - [`InMemoryCache`] is the shared backend owned by the composition root.
//! - [`CacheSession`] binds cache writes to a request's unit of work.

mod memory;
mod port;
mod session;

pub use memory::InMemoryCache;
pub use port::{Cache, CacheError, CacheResult};
pub use session::CacheSession;
