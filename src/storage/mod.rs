//! Session storage: the accessor trait, an in-memory backend and the
//! key-filtered change feed.

mod change;
mod feed;
mod memory;
mod stream;
mod traits;

pub use change::{ChangeKind, ChangeNotification, SubscriptionId};
pub use feed::{ChangeFeed, ChangeFeedConfig};
pub use memory::InMemorySessionStore;
pub use stream::ChangeStream;
pub use traits::{SessionStore, StorageError};
