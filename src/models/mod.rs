pub mod gift;
pub mod session;
pub mod submission;
pub mod tile;

pub use gift::GiftDetails;
pub use session::SessionIdentity;
pub use submission::{HandOffFields, SubmissionDocument, TileUpload};
pub use tile::{MemoryTile, Period, TilePart};
