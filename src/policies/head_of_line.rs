use crate::events::Request;
use crate::policies::{OverflowPolicy, Parked};

/// Holds the blocked request at the front of the pipeline and stops routing
/// until a server of its group frees up.
#[derive(Default)]
pub struct HeadOfLinePolicy {
    blocked: Option<Request>,
}

impl OverflowPolicy for HeadOfLinePolicy {
    fn park(&mut self, request: Request) -> Parked {
        // Routing is halted while a request is held, so this only guards misuse.
        if self.blocked.is_some() {
            return Parked::Lost;
        }
        self.blocked = Some(request);
        Parked::Waiting
    }

    fn release(&mut self, group: usize) -> Option<Request> {
        match self.blocked {
            Some(request) if request.category == group => self.blocked.take(),
            _ => None,
        }
    }

    fn parked(&self) -> usize {
        usize::from(self.blocked.is_some())
    }

    fn halts_routing(&self) -> bool {
        self.blocked.is_some()
    }

    fn admission_slots(&self) -> usize {
        self.parked()
    }
}
