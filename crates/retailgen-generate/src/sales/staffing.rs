//! Checkout staff and their weekly schedules.

use std::ops::Range;

use rand::{Rng, RngCore};

use retailgen_core::Employee;

use crate::sampling::WeightedRandom;

/// Share of a store's employees who work the checkout.
const CHECKOUT_SHARE: f64 = 0.2;
/// Daily probability that a scheduled clerk is on leave.
const LEAVE_RATE: f64 = 0.05;
const DAYS_PER_WEEK: u32 = 7;

/// Half-day checkout window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Morning,
    Afternoon,
}

impl Shift {
    /// Hours of the day covered by the shift.
    pub fn hours(self) -> Range<u32> {
        match self {
            Shift::Morning => 8..14,
            Shift::Afternoon => 14..20,
        }
    }

    pub fn covers(self, hour: u32) -> bool {
        self.hours().contains(&hour)
    }
}

/// A checkout-eligible employee with a fixed weekly pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clerk {
    pub employee_id: i64,
    /// Two consecutive weekdays off, counted from Sunday.
    pub days_off: [u32; 2],
    pub shift: Shift,
    /// Minutes one checkout takes.
    pub checkout_minutes: u32,
}

impl Clerk {
    pub fn works_on(&self, weekday: u32) -> bool {
        !self.days_off.contains(&(weekday % DAYS_PER_WEEK))
    }
}

/// Pick the checkout staff of one store.
///
/// Roughly a fifth of the employees qualify. Days off rotate through the
/// week in eligibility order so coverage spreads evenly.
pub fn derive_clerks<'a, I>(employees: I, rng: &mut impl Rng) -> Vec<Clerk>
where
    I: IntoIterator<Item = &'a Employee>,
{
    let mut eligibility = WeightedRandom::derive(rng, CHECKOUT_SHARE);
    let mut clerks = Vec::new();

    for employee in employees {
        if !eligibility.next_bool() {
            continue;
        }
        let offset = clerks.len() as u32 % DAYS_PER_WEEK;
        let shift = if rng.random_bool(0.5) {
            Shift::Morning
        } else {
            Shift::Afternoon
        };

        clerks.push(Clerk {
            employee_id: employee.id,
            days_off: [offset, (offset + 1) % DAYS_PER_WEEK],
            shift,
            checkout_minutes: rng.random_range(1..4),
        });
    }

    clerks
}

/// Daily leave draws for one store.
#[derive(Debug, Clone)]
pub struct LeaveCalendar {
    leave: WeightedRandom,
}

impl LeaveCalendar {
    pub fn new(rng: &mut impl RngCore) -> Self {
        Self {
            leave: WeightedRandom::derive(rng, LEAVE_RATE),
        }
    }

    /// Clerks working on `weekday`.
    ///
    /// Every clerk gets one leave draw per day, whether or not the day is
    /// one of their days off, so the stream advances the same way each day.
    pub fn roster(&mut self, clerks: &[Clerk], weekday: u32) -> Vec<Clerk> {
        let present: Vec<&Clerk> = clerks
            .iter()
            .filter(|_| !self.leave.next_bool())
            .collect();

        present
            .into_iter()
            .filter(|clerk| clerk.works_on(weekday))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::stream;
    use retailgen_core::{IdSequence, Record};

    fn employees(count: usize) -> Vec<Employee> {
        let mut ids = IdSequence::new();
        (0..count).map(|_| ids.assign(Employee::unknown())).collect()
    }

    #[test]
    fn about_a_fifth_become_clerks() {
        let staff = employees(10_000);
        let clerks = derive_clerks(&staff, &mut stream(6));

        assert!((1_800..2_200).contains(&clerks.len()), "clerks {}", clerks.len());
        for clerk in &clerks {
            assert!((1..4).contains(&clerk.checkout_minutes));
            assert!(staff.iter().any(|e| e.id() == clerk.employee_id));
        }
    }

    #[test]
    fn days_off_rotate_through_the_week() {
        let staff = employees(200);
        let clerks = derive_clerks(&staff, &mut stream(2));

        for (index, clerk) in clerks.iter().enumerate() {
            let first = index as u32 % 7;
            assert_eq!(clerk.days_off, [first, (first + 1) % 7]);
        }
        assert!(clerks.iter().any(|clerk| clerk.days_off == [6, 0]) || clerks.len() < 7);
    }

    #[test]
    fn roster_skips_days_off() {
        let clerk = Clerk {
            employee_id: 1,
            days_off: [0, 1],
            shift: Shift::Morning,
            checkout_minutes: 2,
        };
        assert!(!clerk.works_on(0));
        assert!(!clerk.works_on(1));
        assert!(clerk.works_on(2));

        let mut calendar = LeaveCalendar::new(&mut stream(1));
        let rostered = (0..100)
            .filter(|_| !calendar.roster(std::slice::from_ref(&clerk), 3).is_empty())
            .count();
        assert!((85..=100).contains(&rostered), "rostered {rostered}");
        assert!(calendar.roster(std::slice::from_ref(&clerk), 0).is_empty());
    }

    #[test]
    fn shifts_split_opening_hours() {
        assert!(Shift::Morning.covers(8));
        assert!(!Shift::Morning.covers(14));
        assert!(Shift::Afternoon.covers(14));
        assert!(!Shift::Afternoon.covers(20));
    }
}
