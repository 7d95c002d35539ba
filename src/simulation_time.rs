use crate::core::units::{HOURS_PER_DAY, HOURS_PER_YEAR};

/// Hourly clock over one representative year. Every simulated calendar year replays the same
/// 8760 hours.
#[derive(Clone, Copy, Debug)]
pub struct SimulationTime {
    start_hour: usize,
    end_hour: usize,
}

impl SimulationTime {
    pub fn new(start_hour: usize, end_hour: usize) -> Self {
        Self {
            start_hour,
            end_hour: end_hour.min(HOURS_PER_YEAR),
        }
    }

    pub fn annual() -> Self {
        Self::new(0, HOURS_PER_YEAR)
    }

    pub fn total_steps(&self) -> usize {
        self.end_hour.saturating_sub(self.start_hour)
    }

    pub fn iter(&self) -> SimulationTimeIterator {
        SimulationTimeIterator {
            current_hour: self.start_hour,
            end_hour: self.end_hour,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SimulationTimeIterator {
    current_hour: usize,
    end_hour: usize,
}

impl Iterator for SimulationTimeIterator {
    type Item = SimulationTimeIteration;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_hour >= self.end_hour {
            return None;
        }
        let iteration = SimulationTimeIteration {
            index: self.current_hour,
        };
        self.current_hour += 1;
        Some(iteration)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationTimeIteration {
    pub index: usize,
}

impl SimulationTimeIteration {
    pub fn hour_of_day(&self) -> u32 {
        (self.index % HOURS_PER_DAY as usize) as u32
    }

    pub fn current_day(&self) -> u32 {
        (self.index / HOURS_PER_DAY as usize) as u32
    }
}
