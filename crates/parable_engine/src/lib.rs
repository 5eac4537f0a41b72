pub mod collision;
pub mod config;
pub mod interaction;
pub mod locomotion;
pub mod puzzle;
pub mod runtime;
pub mod scene;

pub use collision::{
    Aabb, Collider, ColliderHandle, ColliderStore, CollisionResolver, PlayerVolume, ResolveResult,
};
pub use config::{
    CollisionTuning, ConfigError, FrameTuning, InteractionTuning, LocomotionTuning, PuzzleTuning,
    TuningConfig, TUNING_PATH_ENV_VAR,
};
pub use interaction::{
    ActivateHandlers, Capability, Channel, GrabHandlers, Interactable, InteractableId,
    InteractableRegistry, InteractionMediator,
};
pub use locomotion::{Locomotion, LocomotionInput, ViewFrame};
pub use puzzle::{
    DeferredTasks, EventBus, LifecycleEvent, LifecycleEventCounts, LifecycleEventKind,
    ProgressionMode, Puzzle, PuzzleContext, PuzzleLifecycle, PuzzleOrchestrator, PuzzleState,
    SubscriptionId, TaskId,
};
pub use runtime::{DesktopInput, FrameInput, FrameReport, HandInput, LevelRuntime, PlayerRig};
pub use scene::{NodeId, Pose, SceneGraph, SceneNode};

pub use glam::{Quat, Vec2, Vec3};
