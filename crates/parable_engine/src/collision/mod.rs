mod aabb;
mod resolver;
mod store;

pub use aabb::Aabb;
pub use resolver::{CollisionResolver, PlayerVolume, ResolveResult};
pub use store::{Collider, ColliderHandle, ColliderStore};
