mod contact;
mod media;
mod post;
mod user;

pub use contact::*;
pub use media::*;
pub use post::*;
pub use user::*;
