pub mod io_util;
pub mod fixtures;
