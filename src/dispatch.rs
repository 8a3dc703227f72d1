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

//! Input dispatch: key presses, pad presses and slide gestures.
//!
//! Every input path funnels into a single press handler, so a pad triggers
//! exactly once per press no matter where the press came from. Slide gestures
//! are edge-triggered on the pad under the pointer: holding still retriggers
//! nothing, crossing into a different pad triggers it, and leaving and
//! re-entering a pad triggers it again.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, error};

use crate::catalog::{self, Pad};
use crate::engine::Instrument;

/// How long a pad reports as active after a trigger. Re-triggering within
/// the window extends it rather than stacking.
const ACTIVE_WINDOW: Duration = Duration::from_millis(100);

pub struct Dispatcher {
    instrument: Arc<Instrument>,
    /// Active-until deadline per pad id.
    active: Mutex<HashMap<&'static str, Instant>>,
    /// The pad most recently triggered by the current slide gesture.
    slide_marker: Mutex<Option<&'static str>>,
}

impl Dispatcher {
    pub fn new(instrument: Arc<Instrument>) -> Dispatcher {
        Dispatcher {
            instrument,
            active: Mutex::new(HashMap::new()),
            slide_marker: Mutex::new(None),
        }
    }

    /// Handles a key press, case-insensitively. Returns true if the key
    /// mapped to a pad; unmapped keys are ignored.
    pub fn handle_key(&self, key: char) -> bool {
        match catalog::for_key(key) {
            Some(pad) => {
                self.press(pad);
                true
            }
            None => {
                debug!(key = %key, "Key maps to no pad");
                false
            }
        }
    }

    /// Handles a direct pad press. All input paths end up here, once per
    /// press.
    pub fn press(&self, pad: &'static Pad) {
        if let Err(e) = self.instrument.play(pad) {
            error!(pad = pad.id, error = %e, "Failed to trigger pad");
        }
        self.mark_active(pad, Instant::now());
    }

    /// Starts a slide gesture on a pad. Only the slide row participates;
    /// gestures starting elsewhere are plain presses with no marker.
    pub fn slide_start(&self, pad: &'static Pad) {
        self.press(pad);
        if pad.slide_row {
            *self.slide_marker.lock() = Some(pad.id);
        }
    }

    /// Handles the pointer crossing a pad mid-slide. Triggers only on the
    /// edge: a different pad than the last one triggered. Pads outside the
    /// slide row are ignored and leave the marker alone.
    pub fn slide_move(&self, pad: &'static Pad) {
        if !pad.slide_row {
            return;
        }

        let mut marker = self.slide_marker.lock();
        if *marker == Some(pad.id) {
            return;
        }
        *marker = Some(pad.id);
        drop(marker);

        self.press(pad);
    }

    /// Ends the slide gesture, clearing the marker so the next gesture
    /// retriggers whatever pad it starts on.
    pub fn slide_end(&self) {
        *self.slide_marker.lock() = None;
    }

    pub fn instrument(&self) -> &Arc<Instrument> {
        &self.instrument
    }

    /// Returns true if the pad triggered within the active window.
    pub fn is_active(&self, pad: &Pad, now: Instant) -> bool {
        let mut active = self.active.lock();
        active.retain(|_, deadline| now < *deadline);
        active.contains_key(pad.id)
    }

    fn mark_active(&self, pad: &'static Pad, now: Instant) {
        // Inserting over an existing deadline extends the window.
        self.active.lock().insert(pad.id, now + ACTIVE_WINDOW);
    }
}
