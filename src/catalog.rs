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

//! The sound catalog: the fixed set of pads and builtin sounds.
//!
//! This is the single authoritative copy of the pad table. The registry,
//! playback engine, input dispatch and the CLI all consume it from here.

/// The names of the bundled sounds. Each corresponds to an audio file named
/// `<name>.<ext>` in the configured sounds directory.
pub const BUILTIN_SOUNDS: [&str; 32] = [
    "1",
    "2",
    "3",
    "4",
    "5",
    "6",
    "7",
    "8",
    "9",
    "10",
    "Snare",
    "Lion_1",
    "Lion_2",
    "LaserGun",
    "R8Clap",
    "Conga",
    "LowBongo",
    "HiBongo",
    "Kick_dog",
    "Digital_Effect_3",
    "Tom_low",
    "Conga_Low",
    "Snare_1",
    "Snare_2",
    "Snare_3",
    "Snare_weird",
    "Flauta",
    "Snare_Gun_1",
    "Snare_Gun_2",
    "Timbal",
    "Kick_thick",
    "R8_Snare",
];

/// A single playable pad. Pads are compiled in; they are never created or
/// destroyed at runtime.
#[derive(Debug)]
pub struct Pad {
    /// Stable identifier, also used to derive user sound keys.
    pub id: &'static str,
    /// The (uppercase) keyboard character that triggers this pad.
    pub key: char,
    /// The builtin sound the pad plays when no custom sound is assigned.
    pub default_sound: &'static str,
    /// Whether the pad belongs to the numeric row, which supports
    /// slide-to-trigger gestures.
    pub slide_row: bool,
}

/// All pads: the number row, three letter rows and the space bar.
pub const PADS: [Pad; 38] = [
    pad('1', "pad_1", "1", true),
    pad('2', "pad_2", "2", true),
    pad('3', "pad_3", "3", true),
    pad('4', "pad_4", "4", true),
    pad('5', "pad_5", "5", true),
    pad('6', "pad_6", "6", true),
    pad('7', "pad_7", "7", true),
    pad('8', "pad_8", "8", true),
    pad('9', "pad_9", "9", true),
    pad('0', "pad_0", "10", true),
    pad('Q', "pad_Q", "Snare", false),
    pad('W', "pad_W", "Lion_1", false),
    pad('E', "pad_E", "Lion_2", false),
    pad('R', "pad_R", "LaserGun", false),
    pad('T', "pad_T", "R8Clap", false),
    pad('Y', "pad_Y", "Conga", false),
    pad('U', "pad_U", "LowBongo", false),
    pad('I', "pad_I", "HiBongo", false),
    pad('O', "pad_O", "Kick_dog", false),
    pad('P', "pad_P", "Digital_Effect_3", false),
    pad('A', "pad_A", "Tom_low", false),
    pad('S', "pad_S", "Conga_Low", false),
    pad('D', "pad_D", "Snare_1", false),
    pad('F', "pad_F", "Snare_1", false),
    pad('G', "pad_G", "Snare_2", false),
    pad('H', "pad_H", "Snare_2", false),
    pad('J', "pad_J", "Snare_3", false),
    pad('K', "pad_K", "Snare_3", false),
    pad('L', "pad_L", "Snare_weird", false),
    pad('Ñ', "pad_Ñ", "Flauta", false),
    pad('Z', "pad_Z", "Snare_Gun_2", false),
    pad('X', "pad_X", "Snare_Gun_1", false),
    pad('C', "pad_C", "Timbal", false),
    pad('V', "pad_V", "Timbal", false),
    pad(' ', "pad_ESPACIO", "Kick_thick", false),
    pad('B', "pad_B", "R8_Snare", false),
    pad('N', "pad_N", "LowBongo", false),
    pad('M', "pad_M", "HiBongo", false),
];

const fn pad(key: char, id: &'static str, default_sound: &'static str, slide_row: bool) -> Pad {
    Pad {
        id,
        key,
        default_sound,
        slide_row,
    }
}

/// Looks up a pad by its identifier.
pub fn get(id: &str) -> Option<&'static Pad> {
    PADS.iter().find(|pad| pad.id == id)
}

/// Looks up a pad by its trigger character. Matching is case-insensitive so
/// that raw key events can be fed in directly.
pub fn for_key(key: char) -> Option<&'static Pad> {
    let key = key.to_uppercase().next().unwrap_or(key);
    PADS.iter().find(|pad| pad.key == key)
}

/// Returns true if the given name is a builtin sound name.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_SOUNDS.contains(&name)
}
