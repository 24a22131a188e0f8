mod selection_cache;

pub use selection_cache::{SELECTED_CHANNELS, SELECTED_PLATFORMS, SelectionCache};
