use crate::environment::{DAYS_PER_YEAR, HOURS_PER_DAY};

/// One point on the simulation time grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Absolute hour index: `day * 24 + hour`.
    pub time_index: usize,
    /// Day within the annual cycle.
    pub day_of_year: usize,
    pub hour: usize,
}

/// A simulation clock that walks a days-by-hours grid.
///
/// Each day covers hours `0..hours_per_day` (at most 24). Time indices keep
/// a 24-hour stride, so a partial day leaves gaps rather than compressing
/// the daily cycle.
///
/// # Examples
///
/// ```
/// use harvest_sim::sim::clock::Clock;
///
/// let mut clock = Clock::new(2, 2, 0);
/// let mut steps = Vec::new();
///
/// clock.run(|tick| steps.push(tick.time_index));
/// assert_eq!(steps, vec![0, 1, 24, 25]);
/// ```
pub struct Clock {
    days: usize,
    hours_per_day: usize,
    start_day: usize,
    /// Steps already handed out.
    current: usize,
}

impl Clock {
    /// Creates a new clock.
    ///
    /// # Arguments
    ///
    /// * `days` - Number of days to walk
    /// * `hours_per_day` - Hours per day (capped at 24)
    /// * `start_day` - Day of year of the first day
    pub fn new(days: usize, hours_per_day: usize, start_day: usize) -> Self {
        Self {
            days,
            hours_per_day: hours_per_day.min(HOURS_PER_DAY),
            start_day,
            current: 0,
        }
    }

    /// Total number of ticks this clock produces.
    pub fn total(&self) -> usize {
        self.days * self.hours_per_day
    }

    /// Advances the clock by one step.
    ///
    /// # Returns
    ///
    /// * `Some(tick)` - The grid point for this step
    /// * `None` - If the clock has reached its total steps
    pub fn tick(&mut self) -> Option<Tick> {
        if self.current >= self.total() {
            return None;
        }
        let day = self.current / self.hours_per_day;
        let hour = self.current % self.hours_per_day;
        self.current += 1;
        Some(Tick {
            time_index: day * HOURS_PER_DAY + hour,
            day_of_year: (self.start_day + day) % DAYS_PER_YEAR,
            hour,
        })
    }

    /// Runs a function for each remaining step in the clock.
    ///
    /// # Arguments
    ///
    /// * `f` - A function that takes the current grid point as an argument
    pub fn run(&mut self, mut f: impl FnMut(Tick)) {
        while let Some(tick) = self.tick() {
            f(tick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock() {
        let clock = Clock::new(5, 24, 0);
        assert_eq!(clock.current, 0);
        assert_eq!(clock.total(), 120);
    }

    #[test]
    fn test_tick() {
        let mut clock = Clock::new(1, 2, 10);
        assert_eq!(
            clock.tick(),
            Some(Tick {
                time_index: 0,
                day_of_year: 10,
                hour: 0
            })
        );
        assert_eq!(clock.tick().map(|t| t.time_index), Some(1));
        assert_eq!(clock.tick(), None);
    }

    #[test]
    fn test_day_of_year_wraps() {
        let mut clock = Clock::new(3, 1, 364);
        let days: Vec<_> = std::iter::from_fn(|| clock.tick())
            .map(|t| t.day_of_year)
            .collect();
        assert_eq!(days, vec![364, 0, 1]);
    }

    #[test]
    fn test_hours_capped() {
        let clock = Clock::new(1, 48, 0);
        assert_eq!(clock.total(), 24);
    }

    #[test]
    fn test_empty_clock() {
        for mut clock in [Clock::new(0, 24, 0), Clock::new(3, 0, 0)] {
            assert_eq!(clock.tick(), None);
            let mut was_called = false;
            clock.run(|_| was_called = true);
            assert!(!was_called);
        }
    }
}
