mod record_open;

pub use record_open::*;
