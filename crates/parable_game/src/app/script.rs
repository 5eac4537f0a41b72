use std::fs;
use std::path::Path;

use parable_engine::{DesktopInput, FrameInput, LocomotionInput};
use serde::{Deserialize, Serialize};

use super::bootstrap::AppError;

/// A canned input session: each step holds its input for `frames` frames.
/// Button edges (`jump`, `desktop_grab`, `desktop_activate`) fire on the
/// step's first frame only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SessionScript {
    pub(crate) frame_rate_hz: f32,
    pub(crate) steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ScriptStep {
    pub(crate) frames: u32,
    #[serde(rename = "move")]
    pub(crate) move_axis: [f32; 2],
    pub(crate) turn: f32,
    pub(crate) jump: bool,
    pub(crate) desktop_grab: bool,
    pub(crate) desktop_activate: bool,
}

impl SessionScript {
    /// Walks the demo level from lever to gate with the desktop channel.
    pub(crate) fn demo() -> Self {
        let idle = ScriptStep::default();
        Self {
            frame_rate_hz: 72.0,
            steps: vec![
                ScriptStep {
                    frames: 1,
                    desktop_activate: true,
                    ..idle
                },
                ScriptStep { frames: 80, ..idle },
                ScriptStep {
                    frames: 1,
                    desktop_grab: true,
                    ..idle
                },
                ScriptStep {
                    frames: 58,
                    move_axis: [0.0, 1.0],
                    ..idle
                },
                ScriptStep {
                    frames: 1,
                    desktop_grab: true,
                    ..idle
                },
                ScriptStep { frames: 80, ..idle },
                ScriptStep {
                    frames: 1,
                    desktop_activate: true,
                    ..idle
                },
                ScriptStep { frames: 10, ..idle },
            ],
        }
    }

    pub(crate) fn from_json_str(raw: &str) -> Result<Self, AppError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let script = serde_path_to_error::deserialize::<_, SessionScript>(&mut deserializer)
            .map_err(|error| {
                let path = error.path().to_string();
                let location = if path.is_empty() || path == "." {
                    "document root".to_string()
                } else {
                    path
                };
                AppError::ScriptParse {
                    location,
                    source: error.into_inner(),
                }
            })?;
        script.validate()?;
        Ok(script)
    }

    pub(crate) fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|source| AppError::ScriptRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub(crate) fn frame_dt_seconds(&self) -> f32 {
        1.0 / self.frame_rate_hz
    }

    pub(crate) fn total_frames(&self) -> u64 {
        self.steps.iter().map(|step| u64::from(step.frames)).sum()
    }

    /// Every frame's input in order.
    pub(crate) fn frames(&self) -> impl Iterator<Item = FrameInput> + '_ {
        self.steps.iter().flat_map(|step| {
            (0..step.frames).map(move |frame| step.frame_input(frame == 0))
        })
    }

    fn validate(&self) -> Result<(), AppError> {
        if !self.frame_rate_hz.is_finite() || self.frame_rate_hz <= 0.0 {
            return Err(AppError::InvalidScript(format!(
                "frame_rate_hz must be positive, got {}",
                self.frame_rate_hz
            )));
        }
        if self.steps.is_empty() {
            return Err(AppError::InvalidScript("steps must not be empty".to_string()));
        }
        for (index, step) in self.steps.iter().enumerate() {
            if step.move_axis.iter().any(|axis| !axis.is_finite()) || !step.turn.is_finite() {
                return Err(AppError::InvalidScript(format!(
                    "steps[{index}] has a non-finite axis value"
                )));
            }
        }
        Ok(())
    }
}

impl ScriptStep {
    fn frame_input(&self, first_frame: bool) -> FrameInput {
        let locomotion = LocomotionInput::default()
            .with_move(self.move_axis[0], self.move_axis[1])
            .with_turn(self.turn)
            .with_jump(self.jump && first_frame);
        FrameInput::empty()
            .with_locomotion(locomotion)
            .with_desktop(DesktopInput {
                grab_toggle_pressed: self.desktop_grab && first_frame,
                activate_pressed: self.desktop_activate && first_frame,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn button_edges_fire_on_first_frame_only() {
        let script = SessionScript {
            frame_rate_hz: 60.0,
            steps: vec![ScriptStep {
                frames: 3,
                desktop_activate: true,
                move_axis: [0.0, 1.0],
                ..ScriptStep::default()
            }],
        };

        let frames: Vec<FrameInput> = script.frames().collect();

        assert_eq!(frames.len(), 3);
        let activations: Vec<bool> = frames
            .iter()
            .map(|frame| frame.desktop().is_some_and(|desktop| desktop.activate_pressed))
            .collect();
        assert_eq!(activations, vec![true, false, false]);
        assert!(frames
            .iter()
            .all(|frame| frame.locomotion().move_axis.y == 1.0));
    }

    #[test]
    fn json_steps_default_missing_fields() {
        let script = SessionScript::from_json_str(
            r#"{"frame_rate_hz": 90, "steps": [{"frames": 2, "move": [1.0, 0.0]}, {"frames": 1}]}"#,
        )
        .expect("script");

        assert_eq!(script.total_frames(), 3);
        assert_eq!(script.steps[0].move_axis, [1.0, 0.0]);
        assert!(!script.steps[1].desktop_grab);
    }

    #[test]
    fn parse_error_reports_step_path() {
        let error = SessionScript::from_json_str(
            r#"{"frame_rate_hz": 90, "steps": [{"frames": 1}, {"frames": "many"}]}"#,
        )
        .expect_err("bad frames");

        match error {
            AppError::ScriptParse { location, .. } => assert_eq!(location, "steps[1].frames"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_or_zero_rate_scripts_are_rejected() {
        assert!(matches!(
            SessionScript::from_json_str(r#"{"frame_rate_hz": 90, "steps": []}"#),
            Err(AppError::InvalidScript(_))
        ));
        assert!(matches!(
            SessionScript::from_json_str(r#"{"frame_rate_hz": 0, "steps": [{"frames": 1}]}"#),
            Err(AppError::InvalidScript(_))
        ));
    }

    #[test]
    fn load_reads_script_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let raw = serde_json::to_string(&SessionScript::demo()).expect("serialize");
        file.write_all(raw.as_bytes()).expect("write");

        let script = SessionScript::load(file.path()).expect("load");

        assert_eq!(script, SessionScript::demo());
    }
}
