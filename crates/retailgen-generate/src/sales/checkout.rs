use super::staffing::Clerk;

#[derive(Debug, Clone)]
struct Lane {
    clerk: Clerk,
    /// Minute of the day the current checkout ends.
    busy_until: Option<u32>,
    /// Hour of the day this clerk last served a customer.
    last_hour: Option<u32>,
}

impl Lane {
    fn available(&self, minute: u32) -> bool {
        let hour = minute / 60;
        if !self.clerk.shift.covers(hour) {
            return false;
        }
        let finished = self.busy_until.is_some_and(|end| end < minute);
        finished || self.last_hour != Some(hour)
    }
}

/// Round-robin assignment of arriving customers to one day's roster.
#[derive(Debug, Clone)]
pub struct CheckoutQueue {
    lanes: Vec<Lane>,
    cursor: usize,
}

impl CheckoutQueue {
    pub fn new(roster: Vec<Clerk>) -> Self {
        let lanes = roster
            .into_iter()
            .map(|clerk| Lane {
                clerk,
                busy_until: None,
                last_hour: None,
            })
            .collect();
        Self { lanes, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Employee ids in current queue order.
    pub fn order(&self) -> Vec<i64> {
        self.lanes.iter().map(|lane| lane.clerk.employee_id).collect()
    }

    /// Serve a customer arriving at `minute` (of the day).
    ///
    /// Scans from where the previous scan stopped. The matched clerk moves
    /// to the back of the queue. Returns `None` for a lost customer, which
    /// also resets the scan to the front.
    pub fn assign(&mut self, minute: u32) -> Option<i64> {
        let count = self.lanes.len();
        for step in 0..count {
            let index = (self.cursor + step) % count;
            if !self.lanes[index].available(minute) {
                continue;
            }

            let mut lane = self.lanes.remove(index);
            lane.busy_until = Some(minute + lane.clerk.checkout_minutes);
            lane.last_hour = Some(minute / 60);
            let employee_id = lane.clerk.employee_id;
            self.lanes.push(lane);
            self.cursor = index % count;
            return Some(employee_id);
        }

        self.cursor = 0;
        None
    }
}
