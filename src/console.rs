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

//! The interactive console.
//!
//! A plain line is played as pad key presses. Lines starting with `:` are
//! commands for changing sounds and volumes. Input is read on a blocking
//! task and forwarded as events to an async consumer that owns the
//! instrument.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tokio::{sync::mpsc::Sender, task::JoinHandle};
use tracing::{error, info, span, warn, Level};

use crate::catalog::{self, Pad};
use crate::dispatch::Dispatcher;

/// An event parsed from a console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Pad key presses, played in order.
    Keys(String),
    /// Assign a builtin sound to a pad.
    Set { pad: String, sound: String },
    /// Upload an audio file as a pad's sound.
    Load { pad: String, path: PathBuf },
    /// Revert a pad to its default sound.
    Reset { pad: String },
    /// Set a pad's volume.
    PadVolume { pad: String, value: f32 },
    /// Set the master volume.
    Master(f32),
    /// Print the pad table.
    Status,
    /// Exit the console.
    Quit,
}

/// Monitors stdin for console input until quit or EOF.
pub fn monitor_events(events_tx: Sender<Event>) -> JoinHandle<Result<(), io::Error>> {
    tokio::task::spawn_blocking(move || {
        let span = span!(Level::INFO, "console");
        let _enter = span.enter();

        info!("Console started.");

        while monitor_io(&events_tx, io::stdin().lock(), io::stdout())? {}
        Ok(())
    })
}

/// Reads and forwards one console line. Returns false once the console
/// should stop.
fn monitor_io<R, W>(events_tx: &Sender<Event>, mut reader: R, mut writer: W) -> Result<bool, io::Error>
where
    R: io::BufRead,
    W: io::Write,
{
    write!(writer, "> ")?;
    writer.flush()?;

    let mut input = String::default();
    if reader.read_line(&mut input)? == 0 {
        // EOF stops the console the same way :quit does.
        let _ = events_tx.blocking_send(Event::Quit);
        return Ok(false);
    }

    let event = match parse_line(&input) {
        Some(event) => event,
        None => return Ok(true),
    };

    let stop = event == Event::Quit;
    events_tx
        .blocking_send(event)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    Ok(!stop)
}

/// Parses a console line into an event. Blank lines and malformed commands
/// parse to nothing.
fn parse_line(line: &str) -> Option<Event> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.trim().is_empty() {
        return None;
    }

    let Some(command) = trimmed.strip_prefix(':') else {
        return Some(Event::Keys(trimmed.to_string()));
    };

    let parts: Vec<&str> = command.split_whitespace().collect();
    match parts.as_slice() {
        ["set", pad, sound] => Some(Event::Set {
            pad: pad.to_string(),
            sound: sound.to_string(),
        }),
        ["load", pad, path] => Some(Event::Load {
            pad: pad.to_string(),
            path: PathBuf::from(path),
        }),
        ["reset", pad] => Some(Event::Reset {
            pad: pad.to_string(),
        }),
        ["volume", pad, value] => match value.parse::<f32>() {
            Ok(value) => Some(Event::PadVolume {
                pad: pad.to_string(),
                value,
            }),
            Err(_) => {
                warn!(value = *value, "Volume must be a number");
                None
            }
        },
        ["master", value] => match value.parse::<f32>() {
            Ok(value) => Some(Event::Master(value)),
            Err(_) => {
                warn!(value = *value, "Volume must be a number");
                None
            }
        },
        ["status"] => Some(Event::Status),
        ["quit"] | ["q"] => Some(Event::Quit),
        _ => {
            warn!(input = trimmed, "Unrecognized command");
            None
        }
    }
}

/// Finds a pad by its id or by its single trigger key.
fn find_pad(arg: &str) -> Option<&'static Pad> {
    let mut chars = arg.chars();
    match (chars.next(), chars.next()) {
        (Some(key), None) => catalog::for_key(key),
        _ => catalog::get(arg),
    }
}

/// Applies console events to the instrument until quit or the sender side
/// closes.
pub async fn run(dispatcher: &Dispatcher, events_rx: &mut tokio::sync::mpsc::Receiver<Event>) {
    while let Some(event) = events_rx.recv().await {
        match event {
            Event::Quit => return,
            Event::Keys(keys) => {
                for key in keys.chars() {
                    dispatcher.handle_key(key);
                }
                // Give short one-shots a moment before the next prompt.
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Event::Status => print_status(dispatcher),
            event => apply(dispatcher, event).await,
        }
    }
}

async fn apply(dispatcher: &Dispatcher, event: Event) {
    let instrument = dispatcher.instrument();
    let result = match event {
        Event::Set { pad, sound } => match find_pad(&pad) {
            Some(pad) => instrument
                .set_builtin_sound(pad, &sound)
                .map_err(|e| e.to_string()),
            None => Err(format!("unknown pad {}", pad)),
        },
        Event::Load { pad, path } => match find_pad(&pad) {
            Some(pad) => match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    let extension = path.extension().and_then(|e| e.to_str());
                    instrument
                        .set_user_sound(pad, &bytes, extension)
                        .await
                        .map_err(|e| e.to_string())
                }
                Err(e) => Err(format!("read {}: {}", path.display(), e)),
            },
            None => Err(format!("unknown pad {}", pad)),
        },
        Event::Reset { pad } => match find_pad(&pad) {
            Some(pad) => instrument.reset_pad(pad).await.map_err(|e| e.to_string()),
            None => Err(format!("unknown pad {}", pad)),
        },
        Event::PadVolume { pad, value } => match find_pad(&pad) {
            Some(pad) => instrument
                .volumes()
                .set_pad(pad.id, value)
                .map_err(|e| e.to_string()),
            None => Err(format!("unknown pad {}", pad)),
        },
        Event::Master(value) => instrument
            .volumes()
            .set_master(value)
            .map_err(|e| e.to_string()),
        Event::Keys(_) | Event::Status | Event::Quit => Ok(()),
    };

    if let Err(e) = result {
        error!(error = e, "Command failed");
    }
}

fn print_status(dispatcher: &Dispatcher) {
    let instrument = dispatcher.instrument();
    println!(
        "Master volume: {:.2}",
        instrument.volumes().master()
    );
    println!("{:<12} {:<5} {:<20} {}", "Pad", "Key", "Sound", "Volume");
    for pad in catalog::PADS.iter() {
        let sound = instrument.registry().resolve(pad);
        let marker = if instrument.has_custom_sound(pad) {
            " (custom)"
        } else {
            ""
        };
        println!(
            "{:<12} {:<5} {:<20} {:.2}",
            pad.id,
            pad.key,
            format!("{}{}", sound, marker),
            instrument.volumes().pad(pad.id),
        );
    }
}
