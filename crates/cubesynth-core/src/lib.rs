pub mod audio;
pub mod bridge;
pub mod camera;
pub mod chord;
pub mod collision;
pub mod constants;
pub mod cooldown;
pub mod drag;
pub mod notes;
pub mod orientation;
pub mod physics;
pub mod pitch;
pub mod scene;
pub mod session;
pub mod sim;

pub use audio::*;
pub use bridge::*;
pub use camera::*;
pub use chord::*;
pub use collision::*;
pub use cooldown::*;
pub use drag::*;
pub use notes::*;
pub use orientation::*;
pub use physics::*;
pub use pitch::*;
pub use scene::*;
pub use session::*;
pub use sim::*;
