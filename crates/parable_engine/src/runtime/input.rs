use crate::locomotion::LocomotionInput;
use crate::scene::Pose;

/// One tracked hand for one frame. `*_pressed`/`*_released` are edges, set
/// only on the frame the button changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandInput {
    /// Pose relative to the player rig root.
    pub local_pose: Pose,
    pub grip_pressed: bool,
    pub grip_released: bool,
    pub trigger_pressed: bool,
}

impl HandInput {
    pub fn at(local_pose: Pose) -> Self {
        Self {
            local_pose,
            grip_pressed: false,
            grip_released: false,
            trigger_pressed: false,
        }
    }

    pub fn with_grip_pressed(mut self, pressed: bool) -> Self {
        self.grip_pressed = pressed;
        self
    }

    pub fn with_grip_released(mut self, released: bool) -> Self {
        self.grip_released = released;
        self
    }

    pub fn with_trigger_pressed(mut self, pressed: bool) -> Self {
        self.trigger_pressed = pressed;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DesktopInput {
    /// Grabs the hovered object, or drops the carried one.
    pub grab_toggle_pressed: bool,
    pub activate_pressed: bool,
}

/// Everything the runtime reads from devices for one frame. Channels left as
/// `None` are not driven that frame and keep their hover state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    locomotion: LocomotionInput,
    head_local: Option<Pose>,
    left_hand: Option<HandInput>,
    right_hand: Option<HandInput>,
    desktop: Option<DesktopInput>,
}

impl FrameInput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_locomotion(mut self, locomotion: LocomotionInput) -> Self {
        self.locomotion = locomotion;
        self
    }

    pub fn with_head_pose(mut self, local: Pose) -> Self {
        self.head_local = Some(local);
        self
    }

    pub fn with_left_hand(mut self, hand: HandInput) -> Self {
        self.left_hand = Some(hand);
        self
    }

    pub fn with_right_hand(mut self, hand: HandInput) -> Self {
        self.right_hand = Some(hand);
        self
    }

    pub fn with_desktop(mut self, desktop: DesktopInput) -> Self {
        self.desktop = Some(desktop);
        self
    }

    pub fn locomotion(&self) -> &LocomotionInput {
        &self.locomotion
    }

    pub fn head_pose(&self) -> Option<Pose> {
        self.head_local
    }

    pub fn left_hand(&self) -> Option<HandInput> {
        self.left_hand
    }

    pub fn right_hand(&self) -> Option<HandInput> {
        self.right_hand
    }

    pub fn desktop(&self) -> Option<DesktopInput> {
        self.desktop
    }
}
