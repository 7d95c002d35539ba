pub mod building;
pub mod envelope;
