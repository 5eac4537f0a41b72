use glam::Vec3;
use tracing::debug;

use super::{Channel, Interactable, InteractableId, InteractableRegistry};
use crate::config::InteractionTuning;
use crate::scene::{NodeId, Pose, SceneGraph};

#[derive(Debug, Clone, Copy)]
struct GrabSession {
    interactable: InteractableId,
    node: NodeId,
    original_parent: Option<NodeId>,
    original_local: Pose,
}

#[derive(Debug, Default, Clone, Copy)]
struct ChannelState {
    frame: Option<NodeId>,
    hovered: Option<InteractableId>,
    session: Option<GrabSession>,
}

/// Per-channel hover, grab, release and activate against the registry.
///
/// Hand channels carry grabbed objects by parenting them to the hand frame.
/// The desktop channel leaves the object's parent alone and places it in
/// front of the view each frame instead (`update_desktop_carry`).
#[derive(Debug)]
pub struct InteractionMediator {
    tuning: InteractionTuning,
    registry: InteractableRegistry,
    channels: [ChannelState; 3],
}

impl InteractionMediator {
    pub fn new(tuning: InteractionTuning) -> Self {
        Self {
            tuning,
            registry: InteractableRegistry::new(),
            channels: [ChannelState::default(); 3],
        }
    }

    pub fn tuning(&self) -> &InteractionTuning {
        &self.tuning
    }

    pub fn registry(&self) -> &InteractableRegistry {
        &self.registry
    }

    pub fn register(&mut self, interactable: Interactable) -> InteractableId {
        self.registry.register(interactable)
    }

    /// Removes `id`, first dropping it out of any hand that holds it. The
    /// object goes back to its original parent without a release callback.
    pub fn unregister(&mut self, scene: &mut SceneGraph, id: InteractableId) -> bool {
        for channel in Channel::ALL {
            let state = &mut self.channels[channel.index()];
            if state.hovered == Some(id) {
                state.hovered = None;
            }
            if state.session.is_some_and(|session| session.interactable == id) {
                if let Some(session) = state.session.take() {
                    restore_parentage(scene, &session);
                    debug!(
                        interactable = id.0,
                        channel = channel.name(),
                        "grab_force_released"
                    );
                }
            }
        }
        self.registry.unregister(id).is_some()
    }

    pub fn set_enabled(&mut self, id: InteractableId, enabled: bool) -> bool {
        self.registry.set_enabled(id, enabled)
    }

    pub fn set_channel_frame(&mut self, channel: Channel, frame: Option<NodeId>) {
        self.channels[channel.index()].frame = frame;
    }

    pub fn channel_frame(&self, channel: Channel) -> Option<NodeId> {
        self.channels[channel.index()].frame
    }

    pub fn hovered(&self, channel: Channel) -> Option<InteractableId> {
        self.channels[channel.index()].hovered
    }

    pub fn held(&self, channel: Channel) -> Option<InteractableId> {
        self.channels[channel.index()]
            .session
            .map(|session| session.interactable)
    }

    pub fn held_by(&self, id: InteractableId) -> Option<Channel> {
        Channel::ALL
            .into_iter()
            .find(|channel| self.held(*channel) == Some(id))
    }

    pub fn is_held(&self, id: InteractableId) -> bool {
        self.held_by(id).is_some()
    }

    /// Re-evaluates what `channel` points at. A ray hit on the object this
    /// channel already carries blocks everything behind it; without a ray hit
    /// a framed hand falls back to the nearest free object in reach.
    pub fn update_hover(
        &mut self,
        scene: &SceneGraph,
        channel: Channel,
        origin: Vec3,
        direction: Vec3,
    ) -> Option<InteractableId> {
        let held_here = self.held(channel);
        let next = match self
            .registry
            .hit_test(scene, origin, direction, self.tuning.ray_max_distance)
        {
            Some((id, _)) if Some(id) == held_here => None,
            Some((id, _)) => Some(id),
            None => self.proximity_candidate(scene, channel),
        };
        self.set_hovered(channel, next);
        next
    }

    pub fn clear_hover(&mut self, channel: Channel) {
        self.set_hovered(channel, None);
    }

    pub fn grab(&mut self, scene: &mut SceneGraph, channel: Channel) -> bool {
        if self.held(channel).is_some() {
            debug!(channel = channel.name(), reason = "hand_full", "grab_rejected");
            return false;
        }
        let Some(id) = self.target(scene, channel) else {
            return false;
        };
        if let Some(holder) = self.held_by(id) {
            debug!(
                interactable = id.0,
                channel = channel.name(),
                holder = holder.name(),
                reason = "already_held",
                "grab_rejected"
            );
            return false;
        }
        let Some(entry) = self.registry.get(id) else {
            return false;
        };
        if !entry.is_enabled() || !entry.capability().can_grab() {
            debug!(
                interactable = id.0,
                channel = channel.name(),
                reason = "not_grabbable",
                "grab_rejected"
            );
            return false;
        }
        let node = entry.node();
        let Some(original_local) = scene.local_pose(node) else {
            return false;
        };
        let original_parent = scene.parent(node);

        if channel.is_hand() {
            let Some(frame) = self.channel_frame(channel) else {
                debug!(channel = channel.name(), reason = "no_frame", "grab_rejected");
                return false;
            };
            if !scene.attach_preserving_world(node, Some(frame)) {
                debug!(
                    interactable = id.0,
                    channel = channel.name(),
                    reason = "reparent_failed",
                    "grab_rejected"
                );
                return false;
            }
        }

        self.channels[channel.index()].session = Some(GrabSession {
            interactable: id,
            node,
            original_parent,
            original_local,
        });
        for other in Channel::ALL {
            if self.hovered(other) == Some(id) {
                self.set_hovered(other, None);
            }
        }
        if let Some(entry) = self.registry.get_mut(id) {
            entry.notify_grab(channel);
        }
        debug!(interactable = id.0, channel = channel.name(), "grabbed");
        true
    }

    /// Lets go of whatever `channel` holds, returning the world position it
    /// was released at.
    pub fn release(&mut self, scene: &mut SceneGraph, channel: Channel) -> Option<Vec3> {
        let session = self.channels[channel.index()].session.take()?;
        let Some(world_position) = scene.world_position(session.node) else {
            debug!(interactable = session.interactable.0, "released_node_missing");
            return None;
        };
        restore_parentage(scene, &session);
        if let Some(entry) = self.registry.get_mut(session.interactable) {
            entry.notify_release(channel, world_position);
        }
        debug!(
            interactable = session.interactable.0,
            channel = channel.name(),
            x = world_position.x,
            y = world_position.y,
            z = world_position.z,
            "released"
        );
        Some(world_position)
    }

    pub fn activate(&mut self, scene: &SceneGraph, channel: Channel) -> bool {
        let Some(id) = self.target(scene, channel) else {
            return false;
        };
        if self.is_held(id) {
            debug!(
                interactable = id.0,
                channel = channel.name(),
                reason = "held",
                "activate_rejected"
            );
            return false;
        }
        let Some(entry) = self.registry.get_mut(id) else {
            return false;
        };
        if !entry.is_enabled() || !entry.capability().can_activate() {
            debug!(
                interactable = id.0,
                channel = channel.name(),
                reason = "not_activatable",
                "activate_rejected"
            );
            return false;
        }
        entry.notify_activate();
        debug!(interactable = id.0, channel = channel.name(), "activated");
        true
    }

    /// Keeps the desktop-held object a fixed distance along the view.
    pub fn update_desktop_carry(
        &mut self,
        scene: &mut SceneGraph,
        view_origin: Vec3,
        view_forward: Vec3,
    ) {
        let Some(session) = self.channels[Channel::Desktop.index()].session else {
            return;
        };
        let Some(forward) = view_forward.try_normalize() else {
            return;
        };
        let target = view_origin + forward * self.tuning.desktop_carry_distance;
        scene.set_world_position(session.node, target);
    }

    /// Teardown path: every held object goes back under its original parent
    /// (or the world root if that parent is gone). No callbacks fire.
    pub fn release_all(&mut self, scene: &mut SceneGraph) {
        for channel in Channel::ALL {
            let state = &mut self.channels[channel.index()];
            state.hovered = None;
            if let Some(session) = state.session.take() {
                restore_parentage(scene, &session);
                debug!(
                    interactable = session.interactable.0,
                    channel = channel.name(),
                    "grab_force_released"
                );
            }
        }
    }

    /// `release_all` followed by dropping every registration.
    pub fn clear(&mut self, scene: &mut SceneGraph) {
        self.release_all(scene);
        self.registry.clear();
    }

    fn target(&self, scene: &SceneGraph, channel: Channel) -> Option<InteractableId> {
        self.hovered(channel)
            .or_else(|| self.proximity_candidate(scene, channel))
    }

    fn proximity_candidate(&self, scene: &SceneGraph, channel: Channel) -> Option<InteractableId> {
        if !channel.is_hand() {
            return None;
        }
        let frame = self.channel_frame(channel)?;
        let point = scene.world_position(frame)?;
        self.registry
            .nearest_within(scene, point, self.tuning.proximity_radius, |id| {
                self.is_held(id)
            })
    }

    fn set_hovered(&mut self, channel: Channel, next: Option<InteractableId>) {
        let previous = self.channels[channel.index()].hovered;
        if previous == next {
            return;
        }
        self.channels[channel.index()].hovered = next;
        if let Some(old) = previous.and_then(|id| self.registry.get_mut(id)) {
            old.notify_hover_exit(channel);
        }
        if let Some(new) = next.and_then(|id| self.registry.get_mut(id)) {
            new.notify_hover_enter(channel);
        }
        debug!(
            channel = channel.name(),
            previous = ?previous.map(|id| id.0),
            current = ?next.map(|id| id.0),
            "hover_changed"
        );
    }
}

fn restore_parentage(scene: &mut SceneGraph, session: &GrabSession) {
    let parent = session
        .original_parent
        .filter(|parent| scene.contains(*parent));
    if scene.attach_preserving_world(session.node, parent) {
        return;
    }
    // The original parent now sits below the object itself.
    debug!(interactable = session.interactable.0, "restore_parent_failed_attached_to_root");
    if !scene.attach_preserving_world(session.node, None) {
        scene.reparent(session.node, None, session.original_local);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Quat;

    use super::*;
    use crate::collision::Aabb;
    use crate::interaction::{ActivateHandlers, Capability, GrabHandlers};

    const EPSILON: f32 = 1.0e-4;

    struct Fixture {
        scene: SceneGraph,
        mediator: InteractionMediator,
        shelf: NodeId,
        left: NodeId,
        right: NodeId,
    }

    fn fixture() -> Fixture {
        let mut scene = SceneGraph::new();
        let shelf = scene.spawn(
            "shelf",
            None,
            Pose::from_translation_rotation(
                Vec3::new(0.0, 1.0, -1.0),
                Quat::from_rotation_y(0.5),
            ),
        );
        let left = scene.spawn("left_hand", None, Pose::from_translation(Vec3::new(-0.3, 1.2, 0.0)));
        let right = scene.spawn("right_hand", None, Pose::from_translation(Vec3::new(0.3, 1.2, 0.0)));
        let mut mediator = InteractionMediator::new(InteractionTuning::default());
        mediator.set_channel_frame(Channel::LeftHand, Some(left));
        mediator.set_channel_frame(Channel::RightHand, Some(right));
        Fixture {
            scene,
            mediator,
            shelf,
            left,
            right,
        }
    }

    fn spawn_cube(scene: &mut SceneGraph, parent: Option<NodeId>, local: Vec3) -> NodeId {
        scene.spawn_mesh(
            "cube",
            parent,
            Pose::from_translation(local),
            Aabb::from_center_size(Vec3::ZERO, Vec3::splat(0.2)),
        )
    }

    type Log = Rc<RefCell<Vec<String>>>;

    fn logged_grabbable(node: NodeId, log: &Log) -> Interactable {
        let grab_log = Rc::clone(log);
        let release_log = Rc::clone(log);
        let enter_log = Rc::clone(log);
        let exit_log = Rc::clone(log);
        Interactable::grabbable(
            node,
            GrabHandlers::new()
                .on_grab(move |channel| grab_log.borrow_mut().push(format!("grab:{}", channel.name())))
                .on_release(move |channel, _| {
                    release_log
                        .borrow_mut()
                        .push(format!("release:{}", channel.name()))
                }),
        )
        .on_hover_enter(move |_| enter_log.borrow_mut().push("enter".to_string()))
        .on_hover_exit(move |_| exit_log.borrow_mut().push("exit".to_string()))
    }

    #[test]
    fn grab_then_release_without_movement_restores_world_pose() {
        let mut f = fixture();
        let cube = spawn_cube(&mut f.scene, Some(f.shelf), Vec3::new(0.1, 0.2, 0.0));
        let id = f.mediator.register(Interactable::grabbable(cube, GrabHandlers::new()));
        let before = f.scene.world_pose(cube).expect("cube");
        let hand_pos = f.scene.world_position(f.left).expect("hand");
        let toward = (before.translation - hand_pos).normalize();

        let hovered = f
            .mediator
            .update_hover(&f.scene, Channel::LeftHand, hand_pos, toward);
        assert_eq!(hovered, Some(id));
        assert!(f.mediator.grab(&mut f.scene, Channel::LeftHand));
        assert_eq!(f.scene.parent(cube), Some(f.left));
        let held_pose = f.scene.world_pose(cube).expect("cube");
        assert!(held_pose.approx_eq(&before, EPSILON));

        let released_at = f.mediator.release(&mut f.scene, Channel::LeftHand).expect("held");

        assert_eq!(f.scene.parent(cube), Some(f.shelf));
        assert!(f.scene.world_pose(cube).expect("cube").approx_eq(&before, EPSILON));
        assert!(released_at.abs_diff_eq(before.translation, EPSILON));
        assert!(!f.mediator.is_held(id));
    }

    #[test]
    fn held_object_follows_hand_and_release_reports_new_position() {
        let mut f = fixture();
        let cube = spawn_cube(&mut f.scene, None, Vec3::new(-0.3, 1.25, 0.0));
        let log: Log = Rc::default();
        f.mediator.register(logged_grabbable(cube, &log));

        assert!(f.mediator.grab(&mut f.scene, Channel::LeftHand));
        f.scene
            .set_local_pose(f.left, Pose::from_translation(Vec3::new(1.0, 1.2, 0.0)));
        let at = f.mediator.release(&mut f.scene, Channel::LeftHand).expect("held");

        assert!(at.abs_diff_eq(Vec3::new(1.0, 1.25, 0.0), EPSILON));
        assert_eq!(f.scene.parent(cube), None);
        assert_eq!(
            log.borrow().as_slice(),
            ["grab:left_hand".to_string(), "release:left_hand".to_string()]
        );
    }

    #[test]
    fn second_channel_cannot_grab_held_object() {
        let mut f = fixture();
        let cube = spawn_cube(&mut f.scene, None, Vec3::new(0.0, 1.2, 0.0));
        let id = f.mediator.register(Interactable::grabbable(cube, GrabHandlers::new()));
        f.scene
            .set_local_pose(f.left, Pose::from_translation(Vec3::new(0.0, 1.25, 0.0)));
        f.scene
            .set_local_pose(f.right, Pose::from_translation(Vec3::new(0.05, 1.2, 0.0)));

        assert!(f.mediator.grab(&mut f.scene, Channel::LeftHand));
        let right_pos = f.scene.world_position(f.right).expect("right hand");
        let toward = (f.scene.world_position(cube).expect("cube") - right_pos).normalize();
        assert_eq!(
            f.mediator.update_hover(&f.scene, Channel::RightHand, right_pos, toward),
            Some(id)
        );

        assert!(!f.mediator.grab(&mut f.scene, Channel::RightHand));
        assert_eq!(f.mediator.held_by(id), Some(Channel::LeftHand));
        assert_eq!(f.mediator.held(Channel::RightHand), None);
        assert_eq!(f.scene.parent(cube), Some(f.left));
    }

    #[test]
    fn activation_rejects_held_objects_and_wrong_capability() {
        let mut f = fixture();
        let activations = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&activations);
        let both = spawn_cube(&mut f.scene, None, Vec3::new(-0.3, 1.2, -2.0));
        let id = f.mediator.register(Interactable::new(
            both,
            Capability::Both {
                grab: GrabHandlers::new(),
                activate: ActivateHandlers::new().on_activate(move || *counter.borrow_mut() += 1),
            },
        ));
        let grab_only = spawn_cube(&mut f.scene, None, Vec3::new(0.3, 1.2, -2.0));
        f.mediator.register(Interactable::grabbable(grab_only, GrabHandlers::new()));

        f.mediator
            .update_hover(&f.scene, Channel::Desktop, Vec3::new(-0.3, 1.2, 0.0), Vec3::NEG_Z);
        assert!(f.mediator.activate(&f.scene, Channel::Desktop));
        assert_eq!(*activations.borrow(), 1);

        f.mediator
            .update_hover(&f.scene, Channel::Desktop, Vec3::new(0.3, 1.2, 0.0), Vec3::NEG_Z);
        assert!(!f.mediator.activate(&f.scene, Channel::Desktop));

        f.mediator
            .update_hover(&f.scene, Channel::Desktop, Vec3::new(-0.3, 1.2, 0.0), Vec3::NEG_Z);
        assert!(f.mediator.grab(&mut f.scene, Channel::Desktop));
        assert_eq!(f.mediator.hovered(Channel::Desktop), None);
        f.mediator.update_hover(
            &f.scene,
            Channel::Desktop,
            Vec3::new(-0.3, 1.2, 0.0),
            Vec3::NEG_Z,
        );
        assert_eq!(f.mediator.hovered(Channel::Desktop), None);
        assert!(!f.mediator.activate(&f.scene, Channel::Desktop));
        assert_eq!(*activations.borrow(), 1);
        assert!(f.mediator.is_held(id));
    }

    #[test]
    fn desktop_carry_keeps_parent_and_follows_view() {
        let mut f = fixture();
        let cube = spawn_cube(&mut f.scene, Some(f.shelf), Vec3::ZERO);
        f.mediator.register(Interactable::grabbable(cube, GrabHandlers::new()));
        let cube_pos = f.scene.world_position(cube).expect("cube");
        let eye = Vec3::new(0.0, 1.6, 1.0);

        f.mediator
            .update_hover(&f.scene, Channel::Desktop, eye, (cube_pos - eye).normalize());
        assert!(f.mediator.grab(&mut f.scene, Channel::Desktop));
        f.mediator
            .update_desktop_carry(&mut f.scene, Vec3::new(2.0, 1.6, 0.0), Vec3::new(0.0, 0.0, -2.0));

        assert_eq!(f.scene.parent(cube), Some(f.shelf));
        let carried = f.scene.world_position(cube).expect("cube");
        assert!(carried.abs_diff_eq(Vec3::new(2.0, 1.6, -0.6), EPSILON));
    }

    #[test]
    fn hover_transitions_fire_exit_before_enter() {
        let mut f = fixture();
        let log: Log = Rc::default();
        let a = spawn_cube(&mut f.scene, None, Vec3::new(0.0, 0.0, -2.0));
        let b = spawn_cube(&mut f.scene, None, Vec3::new(1.0, 0.0, -2.0));
        let a_log = Rc::clone(&log);
        let b_log = Rc::clone(&log);
        let a_exit = Rc::clone(&log);
        f.mediator.register(
            Interactable::grabbable(a, GrabHandlers::new())
                .on_hover_enter(move |_| a_log.borrow_mut().push("enter:a".to_string()))
                .on_hover_exit(move |_| a_exit.borrow_mut().push("exit:a".to_string())),
        );
        f.mediator.register(
            Interactable::grabbable(b, GrabHandlers::new())
                .on_hover_enter(move |_| b_log.borrow_mut().push("enter:b".to_string())),
        );

        f.mediator
            .update_hover(&f.scene, Channel::Desktop, Vec3::ZERO, Vec3::NEG_Z);
        f.mediator
            .update_hover(&f.scene, Channel::Desktop, Vec3::ZERO, Vec3::NEG_Z);
        f.mediator
            .update_hover(&f.scene, Channel::Desktop, Vec3::new(1.0, 0.0, 0.0), Vec3::NEG_Z);

        assert_eq!(
            log.borrow().as_slice(),
            [
                "enter:a".to_string(),
                "exit:a".to_string(),
                "enter:b".to_string()
            ]
        );
    }

    #[test]
    fn proximity_fallback_picks_nearby_object_for_hands_only() {
        let mut f = fixture();
        let cube = spawn_cube(&mut f.scene, None, Vec3::new(0.3, 1.2, 0.15));
        let id = f.mediator.register(Interactable::grabbable(cube, GrabHandlers::new()));
        let hand = f.scene.world_position(f.right).expect("hand");

        let hovered = f
            .mediator
            .update_hover(&f.scene, Channel::RightHand, hand, Vec3::NEG_Z);
        let desktop = f
            .mediator
            .update_hover(&f.scene, Channel::Desktop, hand, Vec3::NEG_Z);

        assert_eq!(hovered, Some(id));
        assert_eq!(desktop, None);
    }

    #[test]
    fn unregister_force_releases_without_callback() {
        let mut f = fixture();
        let cube = spawn_cube(&mut f.scene, Some(f.shelf), Vec3::ZERO);
        let log: Log = Rc::default();
        let id = f.mediator.register(logged_grabbable(cube, &log));
        f.scene.set_local_pose(
            f.left,
            Pose::from_translation(f.scene.world_position(cube).expect("cube")),
        );

        assert!(f.mediator.grab(&mut f.scene, Channel::LeftHand));
        assert!(f.mediator.unregister(&mut f.scene, id));

        assert_eq!(f.scene.parent(cube), Some(f.shelf));
        assert_eq!(f.mediator.held(Channel::LeftHand), None);
        assert!(!log.borrow().iter().any(|entry| entry.starts_with("release")));
    }

    #[test]
    fn release_all_restores_parentage_and_falls_back_to_root() {
        let mut f = fixture();
        let cube = spawn_cube(&mut f.scene, Some(f.shelf), Vec3::ZERO);
        let orphan_parent = f.scene.spawn("cart", None, Pose::IDENTITY);
        let orphan = spawn_cube(&mut f.scene, Some(orphan_parent), Vec3::new(0.3, 1.2, 0.0));
        let log: Log = Rc::default();
        f.mediator.register(logged_grabbable(cube, &log));
        f.mediator
            .register(Interactable::grabbable(orphan, GrabHandlers::new()));
        f.scene.set_local_pose(
            f.left,
            Pose::from_translation(f.scene.world_position(cube).expect("cube")),
        );
        assert!(f.mediator.grab(&mut f.scene, Channel::LeftHand));
        assert!(f.mediator.grab(&mut f.scene, Channel::RightHand));
        f.scene.despawn(orphan_parent);
        // The cart was despawned while the orphan sat in the right hand.
        assert!(f.scene.contains(orphan));

        f.mediator.release_all(&mut f.scene);

        assert_eq!(f.scene.parent(cube), Some(f.shelf));
        assert_eq!(f.scene.parent(orphan), None);
        assert_eq!(f.mediator.held(Channel::LeftHand), None);
        assert_eq!(f.mediator.held(Channel::RightHand), None);
        assert!(!log.borrow().iter().any(|entry| entry.starts_with("release")));
    }

    #[test]
    fn release_falls_back_to_root_when_original_parent_became_a_child() {
        let mut f = fixture();
        let cube = spawn_cube(&mut f.scene, Some(f.shelf), Vec3::ZERO);
        let log: Log = Rc::default();
        let id = f.mediator.register(logged_grabbable(cube, &log));
        f.scene.set_local_pose(
            f.left,
            Pose::from_translation(f.scene.world_position(cube).expect("cube")),
        );
        assert!(f.mediator.grab(&mut f.scene, Channel::LeftHand));
        assert!(f.scene.attach_preserving_world(f.shelf, Some(cube)));
        let before = f.scene.world_position(cube).expect("cube");

        let released_at = f
            .mediator
            .release(&mut f.scene, Channel::LeftHand)
            .expect("held");

        assert_eq!(f.scene.parent(cube), None);
        assert!(!f.scene.is_descendant_of(cube, f.left));
        assert!(released_at.abs_diff_eq(before, EPSILON));
        assert!(f
            .scene
            .world_position(cube)
            .expect("cube")
            .abs_diff_eq(before, EPSILON));
        assert!(!f.mediator.is_held(id));
        assert_eq!(log.borrow().last().map(String::as_str), Some("release:left_hand"));
    }

    #[test]
    fn activation_rejects_object_held_by_another_channel() {
        let mut f = fixture();
        let activations = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&activations);
        let both = spawn_cube(&mut f.scene, None, Vec3::new(-0.3, 1.2, -0.1));
        let id = f.mediator.register(Interactable::new(
            both,
            Capability::Both {
                grab: GrabHandlers::new(),
                activate: ActivateHandlers::new().on_activate(move || *counter.borrow_mut() += 1),
            },
        ));
        assert!(f.mediator.grab(&mut f.scene, Channel::LeftHand));
        assert_eq!(f.mediator.held_by(id), Some(Channel::LeftHand));

        let hovered = f.mediator.update_hover(
            &f.scene,
            Channel::Desktop,
            Vec3::new(-0.3, 1.2, 2.0),
            Vec3::NEG_Z,
        );
        assert_eq!(hovered, Some(id));

        assert!(!f.mediator.activate(&f.scene, Channel::Desktop));
        assert_eq!(*activations.borrow(), 0);
        assert!(f.mediator.is_held(id));
    }

    #[test]
    fn grab_with_nothing_in_reach_is_a_no_op() {
        let mut f = fixture();

        assert!(!f.mediator.grab(&mut f.scene, Channel::LeftHand));
        assert!(!f.mediator.activate(&f.scene, Channel::Desktop));
        assert_eq!(f.mediator.release(&mut f.scene, Channel::RightHand), None);
    }
}
