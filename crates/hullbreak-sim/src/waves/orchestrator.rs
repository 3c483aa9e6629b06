//! The mission's wave schedule plus one-shot tagged waves.

use std::collections::BTreeMap;

use hullbreak_core::commands::PlayerCommand;
use hullbreak_core::constants::WAVE_INITIAL_DELAY_SECS;
use hullbreak_core::enums::DestructionCause;
use hullbreak_core::events::{EventBus, GameEvent};
use hullbreak_core::state::WaveView;
use hullbreak_core::types::ObjectId;
use hullbreak_core::waves::WaveDefinition;

use super::context::{ScriptRunner, WaveExecutionContext};
use super::executor::WaveExecutor;
use crate::context::SimContext;
use crate::incidents::IncidentOrchestrator;
use crate::sector::Sector;

/// Spawns waves in order: the first after an initial delay, each later one
/// when the previous wave's timer runs out or, for waves without a
/// duration, once the previous wave is wiped out.
#[derive(Debug)]
pub struct WaveOrchestrator {
    waves: Vec<WaveDefinition>,
    executor: WaveExecutor,
    scripts: ScriptRunner,
    /// Waves spawned so far; also the index of the next one.
    spawned: usize,
    since_start: f64,
    /// Time since the active wave spawned.
    elapsed: f64,
    running: bool,
    paused: bool,
    active: Option<WaveExecutionContext>,
    active_cleared: bool,
    tagged: BTreeMap<String, WaveExecutionContext>,
    waves_cleared: u32,
}

impl WaveOrchestrator {
    pub fn new(waves: Vec<WaveDefinition>, executor: WaveExecutor) -> Self {
        Self {
            waves,
            executor,
            scripts: ScriptRunner::new(),
            spawned: 0,
            since_start: 0.0,
            elapsed: 0.0,
            running: false,
            paused: false,
            active: None,
            active_cleared: false,
            tagged: BTreeMap::new(),
            waves_cleared: 0,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
        self.paused = false;
        self.spawned = 0;
        self.since_start = 0.0;
        self.elapsed = 0.0;
        self.active = None;
        self.active_cleared = false;
        log::info!("wave schedule started with {} waves", self.waves.len());
    }

    pub fn update(&mut self, dt: f64, ctx: &mut SimContext, incidents: &mut IncidentOrchestrator) {
        if !self.running || self.paused {
            return;
        }

        if self.spawned == 0 {
            self.since_start += dt;
            if self.since_start >= WAVE_INITIAL_DELAY_SECS {
                self.spawn_next_wave(ctx, incidents);
            }
            return;
        }

        let Some(active) = &self.active else {
            return;
        };
        let complete = active.is_complete();
        let duration = active.wave().duration;

        if self.spawned < self.waves.len() {
            let due = match duration {
                Some(interval) => {
                    self.elapsed += dt;
                    self.elapsed >= interval
                }
                None => complete,
            };
            if due {
                self.record_cleared(ctx.bus);
                self.spawn_next_wave(ctx, incidents);
            }
        } else if complete && !self.active_cleared {
            self.record_cleared(ctx.bus);
        }
    }

    fn record_cleared(&mut self, bus: &mut EventBus) {
        if self.active_cleared || self.spawned == 0 {
            return;
        }
        self.active_cleared = true;
        self.waves_cleared += 1;
        bus.publish(GameEvent::WaveCompleted {
            wave_index: self.spawned - 1,
        });
    }

    fn spawn_next_wave(&mut self, ctx: &mut SimContext, incidents: &mut IncidentOrchestrator) {
        let Some(wave) = self.waves.get(self.spawned).cloned() else {
            return;
        };
        let index = self.spawned;
        let exec = self.executor.execute(&wave, Some(index), None, ctx, incidents);
        log::info!(
            "wave {} spawned: {} ships{}",
            index + 1,
            exec.remaining(),
            if wave.is_boss { " (boss)" } else { "" }
        );
        ctx.bus.publish(GameEvent::WaveStarted {
            wave_index: index,
            ships: exec.remaining(),
        });
        self.active = Some(exec);
        self.active_cleared = false;
        self.spawned += 1;
        self.elapsed = 0.0;
    }

    /// Spawn the next wave now. Returns false when not running, paused, or
    /// out of waves.
    pub fn skip_to_next_wave(
        &mut self,
        ctx: &mut SimContext,
        incidents: &mut IncidentOrchestrator,
    ) -> bool {
        if !self.running || self.paused || self.spawned >= self.waves.len() {
            return false;
        }
        self.spawn_next_wave(ctx, incidents);
        true
    }

    /// Whole seconds before the first wave, or seconds left on the active
    /// wave's timer. `None` while stopped, paused, or waiting for a clear.
    pub fn time_until_next_wave(&self) -> Option<f64> {
        if !self.running || self.paused {
            return None;
        }
        if self.spawned == 0 {
            return Some((WAVE_INITIAL_DELAY_SECS - self.since_start).ceil().max(0.0));
        }
        if self.spawned >= self.waves.len() {
            return None;
        }
        let interval = self.active.as_ref()?.wave().duration?;
        Some((interval - self.elapsed).max(0.0))
    }

    pub fn all_waves_completed(&self) -> bool {
        self.spawned >= self.waves.len()
    }

    /// Every wave spawned and the last one cleared.
    pub fn is_finished(&self) -> bool {
        self.all_waves_completed() && (self.active_cleared || self.waves.is_empty())
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_boss_wave_active(&self) -> bool {
        self.active.as_ref().is_some_and(|w| w.wave().is_boss)
    }

    pub fn current_wave_number(&self) -> usize {
        self.spawned
    }

    pub fn waves_cleared(&self) -> u32 {
        self.waves_cleared
    }

    pub fn active_wave(&self) -> Option<&WaveExecutionContext> {
        self.active.as_ref()
    }

    /// Route a destroyed ship to the active wave and any tagged wave. A
    /// tagged wave that empties is dropped and announced.
    pub fn notify_ship_destroyed(&mut self, id: ObjectId, cause: DestructionCause, bus: &mut EventBus) {
        if let Some(active) = &mut self.active {
            active.notify_ship_destroyed(id, cause, &mut self.scripts);
        }
        let mut emptied = Vec::new();
        for (tag, exec) in &mut self.tagged {
            if exec.notify_ship_destroyed(id, cause, &mut self.scripts) && exec.is_complete() {
                emptied.push(tag.clone());
            }
        }
        for tag in emptied {
            self.tagged.remove(&tag);
            log::info!("tagged wave '{tag}' wiped out");
            bus.publish(GameEvent::TaggedWaveCompleted { tag });
        }
    }

    /// Spawn a one-shot wave under `tag`. Ignored while that tag is live.
    pub fn spawn_tagged(
        &mut self,
        tag: &str,
        wave: &WaveDefinition,
        ctx: &mut SimContext,
        incidents: &mut IncidentOrchestrator,
    ) -> bool {
        if self.tagged.contains_key(tag) {
            log::debug!("tagged wave '{tag}' already live");
            return false;
        }
        let exec = self
            .executor
            .execute(wave, None, Some(tag.to_string()), ctx, incidents);
        log::info!("tagged wave '{tag}' spawned: {} ships", exec.remaining());
        self.tagged.insert(tag.to_string(), exec);
        true
    }

    /// Remove a tagged wave and every ship it still has.
    pub fn clear_tagged(&mut self, tag: &str, sector: &mut Sector, bus: &mut EventBus) -> bool {
        let Some(mut exec) = self.tagged.remove(tag) else {
            return false;
        };
        exec.destroy(sector, bus);
        bus.publish(GameEvent::TaggedWaveCompleted {
            tag: tag.to_string(),
        });
        true
    }

    pub fn has_tagged(&self, tag: &str) -> bool {
        self.tagged.contains_key(tag)
    }

    /// Stop the schedule and remove every tagged wave.
    pub fn destroy(&mut self, sector: &mut Sector, bus: &mut EventBus) {
        self.running = false;
        self.paused = true;
        self.active = None;
        let tags: Vec<String> = self.tagged.keys().cloned().collect();
        for tag in tags {
            self.clear_tagged(&tag, sector, bus);
        }
    }

    pub fn scripts_mut(&mut self) -> &mut ScriptRunner {
        &mut self.scripts
    }

    /// Commands queued by wave scripts since the last call.
    pub fn take_script_commands(&mut self) -> Vec<PlayerCommand> {
        self.scripts.take_commands()
    }

    pub fn view(&self) -> WaveView {
        WaveView {
            current_wave: self.spawned,
            total_waves: self.waves.len(),
            time_until_next: self.time_until_next_wave(),
            active_remaining: self.active.as_ref().map_or(0, |w| w.remaining()),
            boss_active: self.is_boss_wave_active(),
            all_spawned: self.all_waves_completed(),
            paused: self.paused,
        }
    }
}
