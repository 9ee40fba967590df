mod head_of_line;
mod reject;
mod waiting_list;

use crate::events::Request;
use crate::models::PolicyConfig;

pub use head_of_line::HeadOfLinePolicy;
pub use reject::RejectPolicy;
pub use waiting_list::WaitingListPolicy;

/// What happens to a routed request that finds every server of its group busy.
pub trait OverflowPolicy {
    fn park(&mut self, request: Request) -> Parked;

    /// A server of `group` just went idle; returns the request it should serve next.
    fn release(&mut self, group: usize) -> Option<Request>;

    /// Requests currently held by the policy.
    fn parked(&self) -> usize;

    fn halts_routing(&self) -> bool {
        false
    }

    /// Admission-queue slots still charged to parked requests.
    fn admission_slots(&self) -> usize {
        0
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Parked {
    Waiting,
    Lost,
}

pub fn build_policy(
    policy: PolicyConfig,
    groups: usize,
    queue_capacity: usize,
) -> Box<dyn OverflowPolicy> {
    match policy {
        PolicyConfig::WaitingList => Box::new(WaitingListPolicy::new(groups, queue_capacity)),
        PolicyConfig::Reject => Box::new(RejectPolicy),
        PolicyConfig::HeadOfLine => Box::new(HeadOfLinePolicy::default()),
    }
}
