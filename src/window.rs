//! Fixed-capacity FIFO history of recent sensor readings.

use std::collections::VecDeque;

use serde::Serialize;

use crate::models::SensorReading;

// ---

/// Capacity used when the configuration does not override it.
pub const DEFAULT_CAPACITY: usize = 100;

/// Average, maximum and minimum of one measured dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub average: f64,
    pub max: f64,
    pub min: f64,
}

impl Summary {
    fn over(values: impl Iterator<Item = f64>) -> Self {
        // ---
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;

        for value in values {
            count += 1;
            sum += value;
            max = max.max(value);
            min = min.min(value);
        }

        if count == 0 {
            return Summary::default();
        }

        Summary {
            average: sum / count as f64,
            max,
            min,
        }
    }
}

/// Statistics over everything currently held in a [`RollingWindow`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WindowStats {
    pub temperature: Summary,
    pub humidity: Summary,
}

/// Bounded, arrival-ordered buffer of [`SensorReading`]s.
///
/// Once full, every push evicts the oldest reading, so `len()` never exceeds
/// `capacity()`. Readings are kept in arrival order and never re-sorted by
/// their capture time. Not synchronised; callers share it behind a lock.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    readings: VecDeque<SensorReading>,
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RollingWindow {
    /// Create an empty window. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        // ---
        let capacity = capacity.max(1);
        Self {
            capacity,
            readings: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Append a reading, evicting the oldest one when the window is full.
    pub fn push(&mut self, reading: SensorReading) {
        // ---
        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    /// Per-dimension statistics; all zero for an empty window.
    pub fn stats(&self) -> WindowStats {
        // ---
        WindowStats {
            temperature: Summary::over(self.readings.iter().map(|r| r.temperature)),
            humidity: Summary::over(self.readings.iter().map(|r| r.humidity)),
        }
    }

    pub fn clear(&mut self) {
        self.readings.clear();
    }

    /// Copy of the current contents, oldest first.
    pub fn all(&self) -> Vec<SensorReading> {
        self.readings.iter().copied().collect()
    }
}
