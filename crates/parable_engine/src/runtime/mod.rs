mod input;
mod level;

pub use input::{DesktopInput, FrameInput, HandInput};
pub use level::{FrameReport, LevelRuntime, PlayerRig};
