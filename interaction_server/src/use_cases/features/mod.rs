// One periodic feature per file. Each pairs a pure `plan_*` function over the
// world state with a `Feature` impl that does the I/O around it.

pub mod archery;
pub mod auto_forge;
pub mod combat;
pub mod drinking;
pub mod gestures;
pub mod roster_button;
pub mod social_button;
pub mod starlight;
pub mod stone_teleport;
pub mod tavern;

pub use archery::ArcheryFeature;
pub use auto_forge::AutoForgeFeature;
pub use combat::CombatFeature;
pub use drinking::DrinkingFeature;
pub use gestures::GestureFeature;
pub use roster_button::RosterButtonFeature;
pub use social_button::SocialButtonFeature;
pub use starlight::StarlightFeature;
pub use stone_teleport::StoneTeleportFeature;
pub use tavern::TavernFeature;
