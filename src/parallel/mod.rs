pub mod batch;
pub mod pool;
pub mod progress;

pub use batch::progress_batches;
pub use pool::WorkerPool;
pub use progress::{Progress, ProgressUpdate, Stage};
