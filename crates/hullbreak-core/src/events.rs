//! Events emitted by the simulation for cross-cutting listeners, plus
//! sound requests for the external audio player.

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::ObjectId;

/// Closed set of notifications published on the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A composite object left the world.
    EntityDestroyed {
        id: ObjectId,
        faction: Faction,
        cause: DestructionCause,
        position: DVec2,
    },
    /// A ship's shield changed state.
    ShieldToggled { id: ObjectId, active: bool },
    /// A turret shot was emitted.
    ProjectileFired { owner: ObjectId, origin: DVec2 },
    /// A scheduled wave was spawned.
    WaveStarted { wave_index: usize, ships: usize },
    /// Every ship of the active wave is gone.
    WaveCompleted { wave_index: usize },
    /// A tagged one-shot wave was cleared or wiped out.
    TaggedWaveCompleted { tag: String },
    IncidentTriggered { incident_id: String, script: String },
    IncidentCompleted { incident_id: String },
    PickupSpawned {
        kind: PickupKind,
        position: DVec2,
        amount: u32,
    },
    PickupCollected { kind: PickupKind, collector: ObjectId },
}

/// Discriminant used to filter subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameEventKind {
    EntityDestroyed,
    ShieldToggled,
    ProjectileFired,
    WaveStarted,
    WaveCompleted,
    TaggedWaveCompleted,
    IncidentTriggered,
    IncidentCompleted,
    PickupSpawned,
    PickupCollected,
}

impl GameEvent {
    pub fn kind(&self) -> GameEventKind {
        match self {
            GameEvent::EntityDestroyed { .. } => GameEventKind::EntityDestroyed,
            GameEvent::ShieldToggled { .. } => GameEventKind::ShieldToggled,
            GameEvent::ProjectileFired { .. } => GameEventKind::ProjectileFired,
            GameEvent::WaveStarted { .. } => GameEventKind::WaveStarted,
            GameEvent::WaveCompleted { .. } => GameEventKind::WaveCompleted,
            GameEvent::TaggedWaveCompleted { .. } => GameEventKind::TaggedWaveCompleted,
            GameEvent::IncidentTriggered { .. } => GameEventKind::IncidentTriggered,
            GameEvent::IncidentCompleted { .. } => GameEventKind::IncidentCompleted,
            GameEvent::PickupSpawned { .. } => GameEventKind::PickupSpawned,
            GameEvent::PickupCollected { .. } => GameEventKind::PickupCollected,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u32);

type Handler = Box<dyn FnMut(&GameEvent) + Send>;

struct Subscription {
    kind: Option<GameEventKind>,
    handler: Handler,
}

/// Typed publish/subscribe channel.
///
/// Handlers run synchronously inside `publish`. Every published event is
/// also buffered until the next `drain`.
#[derive(Default)]
pub struct EventBus {
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    next_id: u32,
    pending: Vec<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to every event.
    pub fn subscribe(&mut self, handler: impl FnMut(&GameEvent) + Send + 'static) -> SubscriptionId {
        self.insert(None, Box::new(handler))
    }

    /// Listen to one kind of event.
    pub fn subscribe_to(
        &mut self,
        kind: GameEventKind,
        handler: impl FnMut(&GameEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.insert(Some(kind), Box::new(handler))
    }

    fn insert(&mut self, kind: Option<GameEventKind>, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.insert(id, Subscription { kind, handler });
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    pub fn publish(&mut self, event: GameEvent) {
        let kind = event.kind();
        for sub in self.subscriptions.values_mut() {
            if sub.kind.is_none_or(|k| k == kind) {
                (sub.handler)(&event);
            }
        }
        self.pending.push(event);
    }

    /// Events published since the last drain, oldest first.
    pub fn pending(&self) -> &[GameEvent] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriptions.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

/// A sound the external audio player should play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundRequest {
    pub file: String,
    pub channel: AudioChannel,
    /// Playback rate multiplier.
    pub pitch: f64,
    pub max_simultaneous: Option<u32>,
}

impl SoundRequest {
    pub fn sfx(file: &str) -> Self {
        Self {
            file: file.to_string(),
            channel: AudioChannel::Sfx,
            pitch: 1.0,
            max_simultaneous: None,
        }
    }

    pub fn with_pitch(mut self, pitch: f64) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn with_max_simultaneous(mut self, max: u32) -> Self {
        self.max_simultaneous = Some(max);
        self
    }
}
