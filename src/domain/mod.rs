pub mod state;
pub mod sync;

pub use state::{Event, StageId};
pub use sync::{StagePayload, SynchronizedData};
