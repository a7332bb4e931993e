mod error;
pub use error::*;

pub mod enums;
pub use enums::*;

pub mod responses;
pub use responses::*;

mod sense;
pub use sense::*;

mod responder;
pub use responder::*;
