//! On-disk layout for in-progress downloads: `temp_<token>` directories
//! holding one append-only `<index>.dat` file per fetched block.

mod block_file;
mod temp;

pub use block_file::{existing_indices, sorted_block_files, write_block};
pub use temp::{create_temp_dir, list_temp_dirs, short_token, TEMP_PREFIX};
