pub mod aircraft;
pub mod assignment;
pub mod clock;
pub mod mission;
pub mod mission_store;
pub mod registry;
pub mod registry_observer;
pub mod template;
pub mod time_window;
pub mod utils;
