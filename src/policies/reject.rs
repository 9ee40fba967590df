use crate::events::Request;
use crate::policies::{OverflowPolicy, Parked};

#[derive(Default)]
pub struct RejectPolicy;

impl OverflowPolicy for RejectPolicy {
    fn park(&mut self, _request: Request) -> Parked {
        Parked::Lost
    }

    fn release(&mut self, _group: usize) -> Option<Request> {
        None
    }

    fn parked(&self) -> usize {
        0
    }
}
