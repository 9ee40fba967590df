use std::collections::VecDeque;

use crate::events::Request;
use crate::policies::{OverflowPolicy, Parked};

/// Bounded FIFO per group for requests that were routed but found no idle
/// server.
pub struct WaitingListPolicy {
    lists: Vec<VecDeque<Request>>,
    capacity: usize,
}

impl WaitingListPolicy {
    pub fn new(groups: usize, queue_capacity: usize) -> Self {
        let capacity = (queue_capacity / groups.max(1)).max(1);
        Self {
            lists: (0..groups).map(|_| VecDeque::new()).collect(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn waiting(&self, group: usize) -> usize {
        self.lists.get(group).map_or(0, VecDeque::len)
    }
}

impl OverflowPolicy for WaitingListPolicy {
    fn park(&mut self, request: Request) -> Parked {
        match self.lists.get_mut(request.category) {
            Some(list) if list.len() < self.capacity => {
                list.push_back(request);
                Parked::Waiting
            }
            _ => Parked::Lost,
        }
    }

    fn release(&mut self, group: usize) -> Option<Request> {
        self.lists.get_mut(group)?.pop_front()
    }

    fn parked(&self) -> usize {
        self.lists.iter().map(VecDeque::len).sum()
    }
}
