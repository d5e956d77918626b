pub mod manager;
pub mod notes;

pub use manager::{DatabaseError, PgPoolBuilder, PoolBuilder, PoolManager};
pub use notes::{Note, NoteStore, PgNoteStore};
