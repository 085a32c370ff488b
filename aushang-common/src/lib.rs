//! Shared model of the bulletin board: posts, their posting windows and the
//! timeline geometry derived from them.

pub mod model;
pub mod status;
pub mod timeline;
pub mod util;
pub mod window;
