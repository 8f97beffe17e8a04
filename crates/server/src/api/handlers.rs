pub mod anime;
pub mod download;
pub mod progress;

pub use anime::{get_anime_details, get_anime_list};
pub use download::start_download;
pub use progress::progress_ws;
