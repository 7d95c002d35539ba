pub mod energy_system;
pub mod material_properties;
pub mod scenario;
pub mod space_heat_demand;
pub mod units;
pub mod user;
