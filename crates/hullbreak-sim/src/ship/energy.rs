//! Ship energy pool.

use serde::{Deserialize, Serialize};

use hullbreak_core::constants::ENERGY_RECHARGE_DELAY_SECS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyComponent {
    current: f64,
    max: f64,
    recharge_per_second: f64,
    time_since_last_use: f64,
}

impl EnergyComponent {
    /// A full pool.
    pub fn new(max: f64, recharge_per_second: f64) -> Self {
        Self {
            current: max,
            max,
            recharge_per_second,
            time_since_last_use: 0.0,
        }
    }

    /// Recharge once the pool has been idle for the recharge delay.
    pub fn update(&mut self, dt: f64) {
        self.time_since_last_use += dt;
        if self.time_since_last_use >= ENERGY_RECHARGE_DELAY_SECS {
            self.current = (self.current + self.recharge_per_second * dt).min(self.max);
        }
    }

    /// Take `amount` if available. A failed spend changes nothing.
    pub fn spend(&mut self, amount: f64) -> bool {
        if self.current < amount {
            return false;
        }
        self.current -= amount;
        self.time_since_last_use = 0.0;
        true
    }

    pub fn add(&mut self, amount: f64) {
        self.current = (self.current + amount).min(self.max);
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn set_max(&mut self, max: f64) {
        self.max = max;
        self.current = self.current.min(max);
    }

    pub fn set_recharge_rate(&mut self, rate: f64) {
        self.recharge_per_second = rate;
    }
}
