pub mod constants;
pub mod components;
pub mod collisions;
pub mod timers;
pub mod boost;
pub mod spawners;
pub mod items;
pub mod lifecycle;

pub use constants::*;
pub use components::*;
pub use collisions::*;
pub use timers::*;
pub use boost::*;
pub use spawners::*;
pub use items::*;
pub use lifecycle::*;
