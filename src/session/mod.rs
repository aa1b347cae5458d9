//! Shared session records: codes, the persisted record, field updates and
//! the service that reads and writes them.

mod record;
mod service;

pub use record::{FieldUpdate, SessionCode, SessionRecord, CODE_LEN};
pub use service::SessionService;
