pub mod cross_session;

pub use cross_session::*;
