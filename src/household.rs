use crate::core::energy_system::system::System;
use crate::core::space_heat_demand::building::Building;
use crate::core::user::UserProfile;
use crate::simulator::{AnnualSimulator, YearResults};

/// The state a player manages: the building, the people living in it and their energy system.
///
/// Events and actions change it between years; the simulator reads it once per year.
#[derive(Clone, Debug)]
pub struct Household {
    pub building: Building,
    pub user: UserProfile,
    pub system: System,
}

impl Household {
    pub fn new(building: Building, user: UserProfile, system: System) -> Self {
        Self {
            building,
            user,
            system,
        }
    }

    /// Simulate `year` and clear the one-off payments the year's balance has consumed.
    pub fn settle_year(
        &mut self,
        year: u32,
        simulator: &AnnualSimulator,
    ) -> anyhow::Result<YearResults> {
        let results = simulator.simulate_year(year, &self.building, &self.user, &mut self.system)?;
        self.user.transactions.clear();

        Ok(results)
    }
}
