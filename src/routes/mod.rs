mod ajax;
mod assets;
mod health_check;
mod home;
mod subscriptions;

pub use ajax::*;
pub use assets::*;
pub use health_check::*;
pub use home::*;
pub use subscriptions::*;
