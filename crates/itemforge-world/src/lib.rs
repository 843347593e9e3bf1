//! itemforge world - in-memory collaborators for the consume engine
//!
//! Simple implementations of the attribute store, effect list, and character
//! interfaces, plus a world that owns players and hands out their handles.

pub mod attributes;
pub mod effects;
pub mod player;
pub mod world;

pub use attributes::AttributeSet;
pub use effects::ActiveEffects;
pub use player::{Player, PlayerSnapshot, PlayerState, PoolSnapshot};
pub use world::{PlayerHandle, World};
