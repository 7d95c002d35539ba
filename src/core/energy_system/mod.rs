pub mod boiler;
pub mod component;
pub mod controller;
pub mod heat_pump;
pub mod pv;
pub mod system;
