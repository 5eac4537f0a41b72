use glam::Vec3;
use tracing::{debug, info};

use super::{FrameInput, HandInput};
use crate::collision::{ColliderHandle, ColliderStore, CollisionResolver};
use crate::config::TuningConfig;
use crate::interaction::{Channel, InteractionMediator};
use crate::locomotion::{Locomotion, ViewFrame};
use crate::puzzle::{
    EventBus, LifecycleEvent, LifecycleEventCounts, Puzzle, PuzzleContext, PuzzleOrchestrator,
};
use crate::scene::{NodeId, Pose, SceneGraph};

const HAND_REST_HEIGHT: f32 = 1.0;
const HAND_REST_SIDE_OFFSET: f32 = 0.25;
const HAND_REST_FORWARD_OFFSET: f32 = 0.3;

/// Scene nodes that make up the player. Head and hands are children of the
/// root, so tracked poses arrive relative to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerRig {
    pub root: NodeId,
    pub head: NodeId,
    pub left_hand: NodeId,
    pub right_hand: NodeId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub dt_seconds: f32,
    pub position: Vec3,
    pub grounded: bool,
    pub hit_ceiling: bool,
    pub events: Vec<LifecycleEvent>,
    pub event_counts: LifecycleEventCounts,
    pub game_complete: bool,
}

/// One loaded level: every core component plus the player rig, stepped once
/// per frame in a fixed order.
pub struct LevelRuntime {
    config: TuningConfig,
    scene: SceneGraph,
    colliders: ColliderStore,
    resolver: CollisionResolver,
    locomotion: Locomotion,
    interaction: InteractionMediator,
    puzzles: PuzzleOrchestrator,
    events: EventBus,
    rig: PlayerRig,
    frame_index: u64,
    started: bool,
}

impl LevelRuntime {
    pub fn new(config: TuningConfig) -> Self {
        let mut scene = SceneGraph::new();
        let root = scene.spawn("player_rig", None, Pose::IDENTITY);
        let head = scene.spawn(
            "player_head",
            Some(root),
            Pose::from_translation(Vec3::new(0.0, config.collision.eye_height, 0.0)),
        );
        let left_hand = scene.spawn(
            "player_left_hand",
            Some(root),
            Pose::from_translation(Vec3::new(
                -HAND_REST_SIDE_OFFSET,
                HAND_REST_HEIGHT,
                -HAND_REST_FORWARD_OFFSET,
            )),
        );
        let right_hand = scene.spawn(
            "player_right_hand",
            Some(root),
            Pose::from_translation(Vec3::new(
                HAND_REST_SIDE_OFFSET,
                HAND_REST_HEIGHT,
                -HAND_REST_FORWARD_OFFSET,
            )),
        );
        let mut interaction = InteractionMediator::new(config.interaction);
        interaction.set_channel_frame(Channel::LeftHand, Some(left_hand));
        interaction.set_channel_frame(Channel::RightHand, Some(right_hand));

        Self {
            config,
            scene,
            colliders: ColliderStore::new(config.collision.ground_height),
            resolver: CollisionResolver::new(config.collision.player_volume()),
            locomotion: Locomotion::new(config.locomotion),
            interaction,
            puzzles: PuzzleOrchestrator::new(config.puzzles.advance_delay_seconds),
            events: EventBus::new(),
            rig: PlayerRig {
                root,
                head,
                left_hand,
                right_hand,
            },
            frame_index: 0,
            started: false,
        }
    }

    pub fn config(&self) -> &TuningConfig {
        &self.config
    }

    pub fn rig(&self) -> PlayerRig {
        self.rig
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn colliders(&self) -> &ColliderStore {
        &self.colliders
    }

    pub fn colliders_mut(&mut self) -> &mut ColliderStore {
        &mut self.colliders
    }

    pub fn interaction(&self) -> &InteractionMediator {
        &self.interaction
    }

    pub fn puzzles(&self) -> &PuzzleOrchestrator {
        &self.puzzles
    }

    pub fn locomotion(&self) -> &Locomotion {
        &self.locomotion
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn player_position(&self) -> Vec3 {
        self.scene
            .world_position(self.rig.root)
            .unwrap_or(Vec3::ZERO)
    }

    /// Makes the world extent of a scene object solid for the player.
    pub fn add_solid_from_scene(&mut self, node: NodeId) -> Option<ColliderHandle> {
        self.colliders.add_box_from_world_extent(&self.scene, node)
    }

    pub fn register_puzzle(&mut self, puzzle: Box<dyn Puzzle>) {
        self.puzzles.register(puzzle);
    }

    /// Initializes the registered puzzles. Later calls do nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        let mut ctx = PuzzleContext::new(
            &mut self.scene,
            &mut self.colliders,
            &mut self.interaction,
            &mut self.events,
        );
        self.puzzles.init(&mut ctx);
        info!(
            puzzle_count = self.puzzles.len(),
            collider_count = self.colliders.len(),
            mode = self.puzzles.mode().name(),
            "level_started"
        );
    }

    /// Moves the player without treating the jump as a fall.
    pub fn teleport(&mut self, position: Vec3) {
        self.scene.set_world_position(self.rig.root, position);
        self.resolver.reset();
        self.locomotion.reset();
        debug!(x = position.x, y = position.y, z = position.z, "player_teleported");
    }

    /// Runs one frame: tracked poses, locomotion, collision, locomotion
    /// commit, interaction, puzzles.
    pub fn step(&mut self, dt_seconds: f32, input: &FrameInput) -> FrameReport {
        let dt = clamp_frame_delta(dt_seconds, self.config.frame.max_frame_delta_seconds);
        self.frame_index = self.frame_index.saturating_add(1);

        self.apply_tracked_poses(input);

        let rig_pose = self.scene.local_pose(self.rig.root).unwrap_or_default();
        let view = self.view_frame();
        let proposed = self
            .locomotion
            .propose(dt, input.locomotion(), rig_pose, view);
        let resolved = self.resolver.resolve(
            proposed.translation,
            self.colliders.colliders(),
            self.colliders.ground_height(),
        );
        self.locomotion.commit(&resolved);
        self.scene.set_local_pose(
            self.rig.root,
            Pose {
                translation: resolved.position,
                ..proposed
            },
        );

        self.step_interaction(input);

        let mut ctx = PuzzleContext::new(
            &mut self.scene,
            &mut self.colliders,
            &mut self.interaction,
            &mut self.events,
        );
        self.puzzles.update(dt, &mut ctx);

        let events = self.events.finish_frame();
        FrameReport {
            frame_index: self.frame_index,
            dt_seconds: dt,
            position: resolved.position,
            grounded: resolved.grounded,
            hit_ceiling: resolved.hit_ceiling,
            events,
            event_counts: self.events.last_frame_counts(),
            game_complete: self.puzzles.is_complete(),
        }
    }

    /// Unloads the level: drops every grab (restoring parentage), disposes
    /// the puzzles and their pending activations, then removes level
    /// geometry. The player rig survives.
    pub fn teardown(&mut self) {
        self.interaction.release_all(&mut self.scene);
        let mut ctx = PuzzleContext::new(
            &mut self.scene,
            &mut self.colliders,
            &mut self.interaction,
            &mut self.events,
        );
        self.puzzles.dispose(&mut ctx);
        self.interaction.clear(&mut self.scene);
        self.colliders.clear();
        self.events.clear();

        let mut removed = 0usize;
        for node in self.scene.roots() {
            if node != self.rig.root && self.scene.despawn(node) {
                removed += 1;
            }
        }
        self.resolver.reset();
        self.started = false;
        info!(removed_root_nodes = removed, "level_torn_down");
    }

    fn apply_tracked_poses(&mut self, input: &FrameInput) {
        if let Some(head) = input.head_pose() {
            self.scene.set_local_pose(self.rig.head, head);
        }
        if let Some(hand) = input.left_hand() {
            self.scene.set_local_pose(self.rig.left_hand, hand.local_pose);
        }
        if let Some(hand) = input.right_hand() {
            self.scene.set_local_pose(self.rig.right_hand, hand.local_pose);
        }
    }

    fn view_frame(&self) -> ViewFrame {
        self.scene
            .world_pose(self.rig.head)
            .map(|pose| ViewFrame::from_pose(&pose))
            .unwrap_or(ViewFrame {
                position: Vec3::ZERO,
                forward: Vec3::NEG_Z,
            })
    }

    fn step_interaction(&mut self, input: &FrameInput) {
        if let Some(hand) = input.left_hand() {
            self.step_hand(Channel::LeftHand, self.rig.left_hand, hand);
        }
        if let Some(hand) = input.right_hand() {
            self.step_hand(Channel::RightHand, self.rig.right_hand, hand);
        }
        let view = self.view_frame();
        if let Some(desktop) = input.desktop() {
            self.interaction
                .update_hover(&self.scene, Channel::Desktop, view.position, view.forward);
            if desktop.grab_toggle_pressed {
                if self.interaction.held(Channel::Desktop).is_some() {
                    self.interaction.release(&mut self.scene, Channel::Desktop);
                } else {
                    self.interaction.grab(&mut self.scene, Channel::Desktop);
                }
            }
            if desktop.activate_pressed {
                self.interaction.activate(&self.scene, Channel::Desktop);
            }
        }
        self.interaction
            .update_desktop_carry(&mut self.scene, view.position, view.forward);
    }

    fn step_hand(&mut self, channel: Channel, node: NodeId, hand: HandInput) {
        let Some(pose) = self.scene.world_pose(node) else {
            return;
        };
        let direction = pose.rotation * Vec3::NEG_Z;
        self.interaction
            .update_hover(&self.scene, channel, pose.translation, direction);
        if hand.grip_released {
            self.interaction.release(&mut self.scene, channel);
        }
        if hand.grip_pressed {
            self.interaction.grab(&mut self.scene, channel);
        }
        if hand.trigger_pressed {
            self.interaction.activate(&self.scene, channel);
        }
    }
}

impl std::fmt::Debug for LevelRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelRuntime")
            .field("frame_index", &self.frame_index)
            .field("started", &self.started)
            .field("rig", &self.rig)
            .field("colliders", &self.colliders.len())
            .field("puzzles", &self.puzzles)
            .finish_non_exhaustive()
    }
}

fn clamp_frame_delta(dt_seconds: f32, max_frame_delta: f32) -> f32 {
    if !dt_seconds.is_finite() || dt_seconds < 0.0 {
        return 0.0;
    }
    dt_seconds.min(max_frame_delta)
}
