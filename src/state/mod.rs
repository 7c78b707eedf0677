mod filter;
mod key;
mod storage;
mod types;

pub use filter::filter_state;
pub use key::{decode_key, encode_key, DOT_ESCAPE};
pub use storage::{read_state, remove_state, write_state, StateError};
pub use types::{FileEntry, SiteState, StateMap};
