mod mediator;
mod registry;

pub use mediator::InteractionMediator;
pub use registry::{
    ActivateCallback, ActivateHandlers, Capability, GrabCallback, GrabHandlers, HoverCallback,
    Interactable, InteractableId, InteractableRegistry, ReleaseCallback,
};

/// An independent source of hover/grab/activate input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    LeftHand,
    RightHand,
    Desktop,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::LeftHand, Channel::RightHand, Channel::Desktop];

    pub fn is_hand(self) -> bool {
        matches!(self, Channel::LeftHand | Channel::RightHand)
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::LeftHand => "left_hand",
            Channel::RightHand => "right_hand",
            Channel::Desktop => "desktop",
        }
    }

    fn index(self) -> usize {
        match self {
            Channel::LeftHand => 0,
            Channel::RightHand => 1,
            Channel::Desktop => 2,
        }
    }
}
