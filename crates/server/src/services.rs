mod acquisition;
mod archive;
mod progress;
mod provider;

pub use acquisition::{AcquisitionError, AcquisitionService};
pub use archive::compress_tar_zst;
pub use progress::{ProgressNotifier, ProgressStore};
pub use provider::ProviderService;
