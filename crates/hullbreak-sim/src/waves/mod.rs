//! Wave scheduling: executing wave definitions, tracking their ships, and
//! firing scripts when groups are wiped out.

pub mod context;
pub mod executor;
pub mod missions;
pub mod modifiers;
pub mod orchestrator;
pub mod spawn_coords;

pub use context::{ScriptContext, ScriptRunner, WaveExecutionContext};
pub use executor::WaveExecutor;
pub use missions::default_mission;
pub use modifiers::WaveModifiersApplier;
pub use orchestrator::WaveOrchestrator;
pub use spawn_coords::SpawnCoordinateResolver;
