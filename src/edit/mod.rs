pub mod editor;
pub mod mutation;
pub mod session;

pub use editor::{AttributeEditor, BulkAddReport, EditorError, UserContext};
pub use mutation::Mutation;
pub use session::{EditSession, EditState, SAVED_COOLDOWN};
