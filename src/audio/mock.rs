// Copyright (C) 2026 The padboard authors
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::{error::Error, fmt, sync::Arc};

use parking_lot::Mutex;

use crate::assets::DecodedSound;

/// A recorded trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub frames: usize,
    pub gain: f32,
}

/// A mock output. Doesn't actually play anything; records every trigger.
#[derive(Clone)]
pub struct Output {
    name: String,
    triggers: Arc<Mutex<Vec<Trigger>>>,
}

impl Output {
    /// Gets the given mock output.
    pub fn get(name: &str) -> Output {
        Output {
            name: name.to_string(),
            triggers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The triggers recorded so far.
    pub fn triggers(&self) -> Vec<Trigger> {
        self.triggers.lock().clone()
    }

    /// The number of triggers recorded so far.
    pub fn trigger_count(&self) -> usize {
        self.triggers.lock().len()
    }
}

impl crate::audio::Output for Output {
    fn trigger(&self, sound: DecodedSound, gain: f32) -> Result<(), Box<dyn Error>> {
        self.triggers.lock().push(Trigger {
            frames: sound.frames(),
            gain,
        });
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        crate::audio::DEFAULT_SAMPLE_RATE
    }

    #[cfg(test)]
    fn to_mock(&self) -> Result<Arc<Output>, Box<dyn Error>> {
        Ok(Arc::new(self.clone()))
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
