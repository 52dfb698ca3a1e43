pub mod types;
pub mod tracking;
pub mod notification;
pub mod policy;
pub mod pixel;

pub use types::*;
pub use tracking::*;
pub use notification::*;
pub use policy::*;
pub use pixel::*;
