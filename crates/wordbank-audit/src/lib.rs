pub mod handlers;
pub mod io;

pub use handlers::{AppState, router};
pub use io::{InputError, read_manual_batches, read_sources, write_outputs};
