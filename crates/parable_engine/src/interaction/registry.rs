use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use glam::Vec3;
use tracing::debug;

use super::Channel;
use crate::scene::{NodeId, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InteractableId(pub u64);

pub type ActivateCallback = Box<dyn FnMut()>;
pub type GrabCallback = Box<dyn FnMut(Channel)>;
pub type ReleaseCallback = Box<dyn FnMut(Channel, Vec3)>;
pub type HoverCallback = Box<dyn FnMut(Channel)>;

#[derive(Default)]
pub struct GrabHandlers {
    on_grab: Option<GrabCallback>,
    on_release: Option<ReleaseCallback>,
}

impl GrabHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_grab(mut self, callback: impl FnMut(Channel) + 'static) -> Self {
        self.on_grab = Some(Box::new(callback));
        self
    }

    /// Receives the world position the object was let go at.
    pub fn on_release(mut self, callback: impl FnMut(Channel, Vec3) + 'static) -> Self {
        self.on_release = Some(Box::new(callback));
        self
    }
}

#[derive(Default)]
pub struct ActivateHandlers {
    on_activate: Option<ActivateCallback>,
}

impl ActivateHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_activate(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_activate = Some(Box::new(callback));
        self
    }
}

pub enum Capability {
    Grab(GrabHandlers),
    Activate(ActivateHandlers),
    Both {
        grab: GrabHandlers,
        activate: ActivateHandlers,
    },
}

impl Capability {
    pub fn can_grab(&self) -> bool {
        matches!(self, Self::Grab(_) | Self::Both { .. })
    }

    pub fn can_activate(&self) -> bool {
        matches!(self, Self::Activate(_) | Self::Both { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Grab(_) => "grab",
            Self::Activate(_) => "activate",
            Self::Both { .. } => "both",
        }
    }

    fn grab_handlers(&mut self) -> Option<&mut GrabHandlers> {
        match self {
            Self::Grab(grab) | Self::Both { grab, .. } => Some(grab),
            Self::Activate(_) => None,
        }
    }

    fn activate_handlers(&mut self) -> Option<&mut ActivateHandlers> {
        match self {
            Self::Activate(activate) | Self::Both { activate, .. } => Some(activate),
            Self::Grab(_) => None,
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scene object the player can hover, grab or activate. Disabled entries
/// stay registered but are skipped by hit-testing and proximity search.
pub struct Interactable {
    node: NodeId,
    capability: Capability,
    enabled: bool,
    on_hover_enter: Option<HoverCallback>,
    on_hover_exit: Option<HoverCallback>,
}

impl Interactable {
    pub fn new(node: NodeId, capability: Capability) -> Self {
        Self {
            node,
            capability,
            enabled: true,
            on_hover_enter: None,
            on_hover_exit: None,
        }
    }

    pub fn grabbable(node: NodeId, handlers: GrabHandlers) -> Self {
        Self::new(node, Capability::Grab(handlers))
    }

    pub fn activatable(node: NodeId, handlers: ActivateHandlers) -> Self {
        Self::new(node, Capability::Activate(handlers))
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn on_hover_enter(mut self, callback: impl FnMut(Channel) + 'static) -> Self {
        self.on_hover_enter = Some(Box::new(callback));
        self
    }

    pub fn on_hover_exit(mut self, callback: impl FnMut(Channel) + 'static) -> Self {
        self.on_hover_exit = Some(Box::new(callback));
        self
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn notify_activate(&mut self) {
        if let Some(callback) = self
            .capability
            .activate_handlers()
            .and_then(|handlers| handlers.on_activate.as_mut())
        {
            callback();
        }
    }

    pub(crate) fn notify_grab(&mut self, channel: Channel) {
        if let Some(callback) = self
            .capability
            .grab_handlers()
            .and_then(|handlers| handlers.on_grab.as_mut())
        {
            callback(channel);
        }
    }

    pub(crate) fn notify_release(&mut self, channel: Channel, world_position: Vec3) {
        if let Some(callback) = self
            .capability
            .grab_handlers()
            .and_then(|handlers| handlers.on_release.as_mut())
        {
            callback(channel, world_position);
        }
    }

    pub(crate) fn notify_hover_enter(&mut self, channel: Channel) {
        if let Some(callback) = self.on_hover_enter.as_mut() {
            callback(channel);
        }
    }

    pub(crate) fn notify_hover_exit(&mut self, channel: Channel) {
        if let Some(callback) = self.on_hover_exit.as_mut() {
            callback(channel);
        }
    }
}

impl fmt::Debug for Interactable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interactable")
            .field("node", &self.node)
            .field("capability", &self.capability)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Interactables keyed by id. Iteration follows registration order.
#[derive(Debug, Default)]
pub struct InteractableRegistry {
    next_id: u64,
    entries: BTreeMap<InteractableId, Interactable>,
}

impl InteractableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, interactable: Interactable) -> InteractableId {
        let id = InteractableId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        debug!(
            interactable = id.0,
            node = interactable.node.0,
            capability = interactable.capability.name(),
            "interactable_registered"
        );
        self.entries.insert(id, interactable);
        id
    }

    pub fn unregister(&mut self, id: InteractableId) -> Option<Interactable> {
        let removed = self.entries.remove(&id);
        if removed.is_some() {
            debug!(interactable = id.0, "interactable_unregistered");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, id: InteractableId) -> Option<&Interactable> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: InteractableId) -> Option<&mut Interactable> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: InteractableId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn set_enabled(&mut self, id: InteractableId, enabled: bool) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = InteractableId> + '_ {
        self.entries.keys().copied()
    }

    pub fn find_by_node(&self, node: NodeId) -> Option<InteractableId> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.node == node)
            .map(|(id, _)| *id)
    }

    /// The interactable a scene node belongs to: the registered node itself
    /// or the closest registered ancestor's entry when `node` is a sub-part.
    pub fn owner_of(&self, scene: &SceneGraph, node: NodeId) -> Option<InteractableId> {
        let registered = self.registered_nodes();
        self.entries
            .iter()
            .find(|(_, entry)| parts_of(scene, entry.node, &registered).contains(&node))
            .map(|(id, _)| *id)
    }

    /// Nearest enabled interactable whose parts are hit by the ray, with the
    /// hit distance. Ties go to the earlier registration.
    pub fn hit_test(
        &self,
        scene: &SceneGraph,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<(InteractableId, f32)> {
        let direction = direction.try_normalize()?;
        let registered = self.registered_nodes();
        let mut best: Option<(InteractableId, f32)> = None;
        for (id, entry) in self.entries.iter().filter(|(_, entry)| entry.enabled) {
            for part in parts_of(scene, entry.node, &registered) {
                let Some(bounds) = scene.world_mesh_bounds(part) else {
                    continue;
                };
                let Some(distance) = bounds.ray_distance(origin, direction) else {
                    continue;
                };
                if distance > max_distance {
                    continue;
                }
                if best.map_or(true, |(_, nearest)| distance < nearest) {
                    best = Some((*id, distance));
                }
            }
        }
        best
    }

    /// Nearest enabled interactable whose origin lies within `radius` of
    /// `point`, ignoring ids for which `skip` returns true.
    pub fn nearest_within(
        &self,
        scene: &SceneGraph,
        point: Vec3,
        radius: f32,
        skip: impl Fn(InteractableId) -> bool,
    ) -> Option<InteractableId> {
        let mut best: Option<(InteractableId, f32)> = None;
        for (id, entry) in self.entries.iter().filter(|(_, entry)| entry.enabled) {
            if skip(*id) {
                continue;
            }
            let Some(position) = scene.world_position(entry.node) else {
                continue;
            };
            let distance = position.distance(point);
            if distance > radius {
                continue;
            }
            if best.map_or(true, |(_, nearest)| distance < nearest) {
                best = Some((*id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    fn registered_nodes(&self) -> BTreeSet<NodeId> {
        self.entries.values().map(|entry| entry.node).collect()
    }
}

/// `root` plus every descendant that is not itself (or under) another
/// registered interactable.
fn parts_of(scene: &SceneGraph, root: NodeId, registered: &BTreeSet<NodeId>) -> Vec<NodeId> {
    let mut parts = Vec::new();
    if !scene.contains(root) {
        return parts;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        parts.push(node);
        if let Some(entry) = scene.node(node) {
            for child in entry.children().iter().rev() {
                if !registered.contains(child) {
                    stack.push(*child);
                }
            }
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::collision::Aabb;
    use crate::scene::Pose;

    fn cube(scene: &mut SceneGraph, name: &str, parent: Option<NodeId>, at: Vec3) -> NodeId {
        scene.spawn_mesh(
            name,
            parent,
            Pose::from_translation(at),
            Aabb::from_center_size(Vec3::ZERO, Vec3::splat(0.2)),
        )
    }

    #[test]
    fn capability_reports_what_it_supports() {
        assert!(Capability::Grab(GrabHandlers::new()).can_grab());
        assert!(!Capability::Grab(GrabHandlers::new()).can_activate());
        assert!(Capability::Activate(ActivateHandlers::new()).can_activate());
        let both = Capability::Both {
            grab: GrabHandlers::new(),
            activate: ActivateHandlers::new(),
        };
        assert!(both.can_grab() && both.can_activate());
    }

    #[test]
    fn hit_test_resolves_sub_part_to_owner() {
        let mut scene = SceneGraph::new();
        let lever = scene.spawn("lever", None, Pose::from_translation(Vec3::new(0.0, 1.0, -2.0)));
        cube(&mut scene, "lever_handle", Some(lever), Vec3::new(0.0, 0.3, 0.0));
        let mut registry = InteractableRegistry::new();
        let id = registry.register(Interactable::activatable(lever, ActivateHandlers::new()));

        let hit = registry.hit_test(&scene, Vec3::new(0.0, 1.3, 0.0), Vec3::NEG_Z, 10.0);

        let (hit_id, distance) = hit.expect("ray should hit the handle");
        assert_eq!(hit_id, id);
        assert!((distance - 1.9).abs() < 1.0e-4);
    }

    #[test]
    fn nested_interactable_owns_its_own_parts() {
        let mut scene = SceneGraph::new();
        let table = cube(&mut scene, "table", None, Vec3::new(0.0, 0.0, -3.0));
        let cup = cube(&mut scene, "cup", Some(table), Vec3::new(0.0, 0.0, 1.0));
        let mut registry = InteractableRegistry::new();
        let table_id = registry.register(Interactable::grabbable(table, GrabHandlers::new()));
        let cup_id = registry.register(Interactable::grabbable(cup, GrabHandlers::new()));

        let hit = registry.hit_test(&scene, Vec3::ZERO, Vec3::NEG_Z, 10.0);

        assert_eq!(hit.map(|(id, _)| id), Some(cup_id));
        assert_eq!(registry.owner_of(&scene, cup), Some(cup_id));
        assert_eq!(registry.owner_of(&scene, table), Some(table_id));
    }

    #[test]
    fn disabled_interactables_are_invisible() {
        let mut scene = SceneGraph::new();
        let node = cube(&mut scene, "crate", None, Vec3::new(0.0, 0.0, -1.0));
        let mut registry = InteractableRegistry::new();
        let id = registry.register(
            Interactable::grabbable(node, GrabHandlers::new()).with_enabled(false),
        );

        assert!(registry.hit_test(&scene, Vec3::ZERO, Vec3::NEG_Z, 10.0).is_none());
        assert!(registry
            .nearest_within(&scene, Vec3::new(0.0, 0.0, -1.0), 0.2, |_| false)
            .is_none());

        assert!(registry.set_enabled(id, true));
        assert!(registry.hit_test(&scene, Vec3::ZERO, Vec3::NEG_Z, 10.0).is_some());
    }

    #[test]
    fn ray_beyond_max_distance_misses() {
        let mut scene = SceneGraph::new();
        let node = cube(&mut scene, "far", None, Vec3::new(0.0, 0.0, -20.0));
        let mut registry = InteractableRegistry::new();
        registry.register(Interactable::grabbable(node, GrabHandlers::new()));

        assert!(registry.hit_test(&scene, Vec3::ZERO, Vec3::NEG_Z, 10.0).is_none());
    }

    #[test]
    fn nearest_within_picks_closest_and_honors_skip() {
        let mut scene = SceneGraph::new();
        let near = cube(&mut scene, "near", None, Vec3::new(0.05, 0.0, 0.0));
        let far = cube(&mut scene, "far", None, Vec3::new(0.15, 0.0, 0.0));
        let mut registry = InteractableRegistry::new();
        let near_id = registry.register(Interactable::grabbable(near, GrabHandlers::new()));
        let far_id = registry.register(Interactable::grabbable(far, GrabHandlers::new()));

        assert_eq!(
            registry.nearest_within(&scene, Vec3::ZERO, 0.2, |_| false),
            Some(near_id)
        );
        assert_eq!(
            registry.nearest_within(&scene, Vec3::ZERO, 0.2, |id| id == near_id),
            Some(far_id)
        );
        assert_eq!(registry.nearest_within(&scene, Vec3::ZERO, 0.01, |_| false), None);
    }

    #[test]
    fn callbacks_route_through_capability() {
        let activations = Rc::new(Cell::new(0));
        let grabs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&activations);
        let grab_counter = Rc::clone(&grabs);
        let mut interactable = Interactable::new(
            NodeId(0),
            Capability::Both {
                grab: GrabHandlers::new().on_grab(move |_| grab_counter.set(grab_counter.get() + 1)),
                activate: ActivateHandlers::new().on_activate(move || counter.set(counter.get() + 1)),
            },
        );

        interactable.notify_activate();
        interactable.notify_grab(Channel::LeftHand);
        interactable.notify_release(Channel::LeftHand, Vec3::ZERO);

        assert_eq!(activations.get(), 1);
        assert_eq!(grabs.get(), 1);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut registry = InteractableRegistry::new();
        let first = registry.register(Interactable::grabbable(NodeId(1), GrabHandlers::new()));
        registry.unregister(first).expect("registered");

        let second = registry.register(Interactable::grabbable(NodeId(1), GrabHandlers::new()));

        assert_ne!(first, second);
        assert_eq!(registry.find_by_node(NodeId(1)), Some(second));
    }
}
