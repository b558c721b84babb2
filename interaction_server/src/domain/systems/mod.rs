// Stateless interaction rules and the projectile simulation.

pub mod classifier;
pub mod projectiles;

pub use classifier::{FaceGesture, Hand, HandGesture};
pub use projectiles::{
    Projectile, ProjectileConfig, ProjectileEvent, ProjectileKind, ProjectileSimulator,
};
