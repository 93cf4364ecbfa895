use crossbeam_channel::{Receiver, Sender};
use midir::{MidiInput, MidiInputConnection};

use crate::error::MidiError;

mod decoder;

pub use decoder::{decode, NoteEvent};

const CLIENT_NAME: &str = "padgrid";

/// An attached MIDI input device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiDevice {
    pub id: String,
    pub name: String,
    pub manufacturer: Option<String>,
}

impl MidiDevice {
    fn new(id: String, name: String) -> Self {
        // ALSA-style names carry the client before the colon
        let manufacturer = name
            .split_once(':')
            .map(|(client, _)| client.trim().to_string())
            .filter(|client| !client.is_empty());
        Self { id, name, manufacturer }
    }
}

/// Enumerates inputs and keeps at most one of them connected.
///
/// Decoded note events from the connected device arrive on an internal
/// channel and are drained with [`MidiInputManager::poll_events`].
pub struct MidiInputManager {
    midi_in: MidiInput,
    connection: Option<MidiInputConnection<()>>,
    connected_id: Option<String>,
    devices: Vec<MidiDevice>,
    tx: Sender<NoteEvent>,
    rx: Receiver<NoteEvent>,
}

impl MidiInputManager {
    pub fn new() -> Result<Self, MidiError> {
        let midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| MidiError::Unavailable(e.to_string()))?;
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut manager = Self {
            midi_in,
            connection: None,
            connected_id: None,
            devices: Vec::new(),
            tx,
            rx,
        };
        manager.refresh_ports();
        Ok(manager)
    }

    /// Re-enumerate inputs. Returns true when the set of devices changed.
    pub fn refresh_ports(&mut self) -> bool {
        let devices: Vec<MidiDevice> = self
            .midi_in
            .ports()
            .iter()
            .filter_map(|port| {
                let name = self.midi_in.port_name(port).ok()?;
                Some(MidiDevice::new(port.id(), name))
            })
            .collect();

        if devices == self.devices {
            return false;
        }
        log::info!("MIDI inputs changed: {} device(s) attached", devices.len());
        for device in &devices {
            log::debug!("  {} ({}, {})", device.name, device.id, device.manufacturer.as_deref().unwrap_or("unknown maker"));
        }
        self.devices = devices;
        if port_gone(self.connected_id.as_deref(), &self.devices) {
            log::warn!("connected MIDI input went away");
            self.disconnect();
        }
        true
    }

    pub fn connected_id(&self) -> Option<&str> {
        self.connected_id.as_deref()
    }

    pub fn devices(&self) -> &[MidiDevice] {
        &self.devices
    }

    /// Detach from the current device, then attach to `id` if given.
    pub fn select(&mut self, id: Option<&str>) -> Result<(), MidiError> {
        self.disconnect();
        let Some(id) = id else {
            return Ok(());
        };

        // connecting consumes the MidiInput, so work on a fresh one
        let midi_in = MidiInput::new(CLIENT_NAME).map_err(|e| MidiError::Unavailable(e.to_string()))?;
        let port = midi_in
            .find_port_by_id(id.to_string())
            .ok_or_else(|| MidiError::UnknownPort(id.to_string()))?;
        let port_name = midi_in.port_name(&port).unwrap_or_else(|_| id.to_string());

        let tx = self.tx.clone();
        let connection = midi_in
            .connect(
                &port,
                "padgrid-input",
                move |_timestamp, message, _| {
                    if let Some(event) = decode(message) {
                        let _ = tx.send(event);
                    }
                },
                (),
            )
            .map_err(|e| MidiError::Connect { port: port_name.clone(), reason: e.to_string() })?;

        log::info!("MIDI input connected: {port_name}");
        self.connection = Some(connection);
        self.connected_id = Some(id.to_string());
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some(conn) = self.connection.take() {
            conn.close();
            log::info!("MIDI input disconnected");
        }
        self.connected_id = None;
        // anything still queued came from the old device
        while self.rx.try_recv().is_ok() {}
    }

    /// Drain pending note events (non-blocking)
    pub fn poll_events(&self) -> Vec<NoteEvent> {
        self.rx.try_iter().collect()
    }
}

// The connected port no longer shows up in enumeration
fn port_gone(connected: Option<&str>, devices: &[MidiDevice]) -> bool {
    connected.is_some_and(|id| !devices.iter().any(|d| d.id == id))
}

impl Drop for MidiInputManager {
    fn drop(&mut self) {
        self.disconnect();
    }
}
