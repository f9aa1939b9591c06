// src/model/queues.rs

use std::collections::VecDeque;

/// Goods in transit between an agent's order decision and their arrival.
///
/// The queue always holds exactly `max(1, lead_time)` slots. Every call to
/// [`Pipeline::advance`] pops one slot and pushes one, so the depth is fixed
/// for the lifetime of the pipeline. Cloning yields an independent copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    buffer: VecDeque<u32>,
    lead_time: usize,
}

impl Pipeline {
    pub fn new(lead_time: usize) -> Self {
        let depth = lead_time.max(1);
        // Pre-fill with 0s so the first orders take `depth` ticks to arrive
        let buffer = std::iter::repeat(0).take(depth).collect();

        Self { buffer, lead_time }
    }

    /// Ships `order` into the pipe and returns what lands this tick.
    pub fn advance(&mut self, order: u32) -> u32 {
        let arrival = self.buffer.pop_front().unwrap_or(0);
        self.buffer.push_back(order);
        arrival
    }

    /// Sum of everything currently on the way, saturating at `u32::MAX`.
    pub fn in_transit(&self) -> u32 {
        self.buffer
            .iter()
            .fold(0u32, |total, &qty| total.saturating_add(qty))
    }

    /// Configured lead time, before clamping.
    pub fn lead_time(&self) -> usize {
        self.lead_time
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Slot contents, oldest (next arrival) first.
    pub fn contents(&self) -> impl Iterator<Item = u32> + '_ {
        self.buffer.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_lead_time_still_takes_one_tick() {
        let mut pipe = Pipeline::new(0);
        assert_eq!(pipe.len(), 1);
        assert_eq!(pipe.advance(7), 0);
        assert_eq!(pipe.advance(3), 7);
        assert_eq!(pipe.lead_time(), 0);
    }

    #[test]
    fn orders_arrive_after_lead_time() {
        let mut pipe = Pipeline::new(3);
        let arrivals: Vec<u32> = [10, 20, 30, 40, 50].iter().map(|&o| pipe.advance(o)).collect();
        assert_eq!(arrivals, vec![0, 0, 0, 10, 20]);
        assert_eq!(pipe.in_transit(), 30 + 40 + 50);
        assert_eq!(pipe.len(), 3);
    }

    #[test]
    fn clone_is_independent() {
        let mut original = Pipeline::new(2);
        original.advance(5);
        let mut copy = original.clone();
        copy.advance(9);

        assert_eq!(original.contents().collect::<Vec<_>>(), vec![0, 5]);
        assert_eq!(copy.contents().collect::<Vec<_>>(), vec![5, 9]);
    }

    #[test]
    fn in_transit_saturates() {
        let mut pipe = Pipeline::new(2);
        pipe.advance(u32::MAX - 1);
        pipe.advance(u32::MAX - 1);
        assert_eq!(pipe.in_transit(), u32::MAX);
    }
}
