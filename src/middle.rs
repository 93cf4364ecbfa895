// The middle layer: owns the app state and the audio bank, turns input into
// state changes, and hands back whatever the platform side has to do. It
// never touches the audio device, MIDI ports or threads itself, and every
// timing decision takes an explicit `Instant`.

use std::path::PathBuf;
use std::time::Instant;

use crate::audio_api::AudioCommand;
use crate::loader::sample_loader::{check_audio_file, DecodeRequest, DecodeResult};
use crate::midi::{MidiDevice, NoteEvent};
use crate::pipeline::bank::AudioBank;
use crate::pipeline::color::{glow_color, note_label};
use crate::pipeline::grid::build_grid;
use crate::pipeline::project::{AppState, AssignRequest};
use crate::shared::{AssignView, DisplayState, InputEvent, PadId, PadView, DECAY, LONG_PRESS};

#[derive(Clone, Debug)]
pub enum Command {
    Audio(AudioCommand),
    SelectMidiInput(Option<String>),
    Decode(DecodeRequest),
}

#[derive(Clone, Copy, Debug)]
struct PointerHold {
    pad: PadId,
    since: Instant,
    fired: bool,
}

#[derive(Clone, Copy, Debug)]
struct Decay {
    due: Instant,
    pad: PadId,
}

pub struct Middle {
    pub state: AppState,
    bank: AudioBank,
    decays: Vec<Decay>, // never cancelled, see `release`
    hold: Option<PointerHold>,
    preferred_input: Option<String>, // device name fragment to auto-select
    lost_input: Option<MidiDevice>,  // selected device that was unplugged
}

impl Middle {
    pub fn with_state(state: AppState, sample_rate: u32) -> Self {
        Self {
            state,
            bank: AudioBank::new(sample_rate),
            decays: Vec::new(),
            hold: None,
            preferred_input: None,
            lost_input: None,
        }
    }

    pub fn set_preferred_input(&mut self, fragment: Option<String>) {
        self.preferred_input = fragment.filter(|f| !f.trim().is_empty());
    }

    // Default tones for every pad in the current grid
    pub fn register_default_sounds(&mut self) -> Vec<Command> {
        self.state
            .pads
            .iter()
            .map(|pad| Command::Audio(self.bank.register_default(pad)))
            .collect()
    }

    pub fn handle_input(&mut self, event: InputEvent, now: Instant) -> Vec<Command> {
        match event {
            InputEvent::PointerDown(pad) => {
                self.hold = Some(PointerHold { pad, since: now, fired: false });
                self.press(pad).into_iter().collect()
            }
            InputEvent::PadDown(pad) => self.press(pad).into_iter().collect(),
            InputEvent::PadUp(pad) => {
                self.release(pad, now);
                vec![]
            }
            InputEvent::PointerReleased => {
                self.hold = None;
                self.release_all(now);
                vec![]
            }
            InputEvent::PadContext(pad) => {
                self.open_assign(pad);
                vec![]
            }
            InputEvent::Midi(note_event) => self.handle_note(note_event, now),

            InputEvent::CycleColorScheme => {
                let scheme = self.state.config.color_scheme.next();
                self.state.config.color_scheme = scheme;
                for pad in &mut self.state.pads {
                    pad.recolor(scheme);
                }
                log::debug!("color scheme: {}", scheme.tag());
                vec![]
            }
            InputEvent::CycleGridSize => {
                self.state.config.grid_size = self.state.config.grid_size.next();
                self.rebuild_grid()
            }
            InputEvent::CycleMidiInput => self.cycle_midi_input(),
            InputEvent::DismissError => {
                self.state.error = None;
                vec![]
            }

            InputEvent::AssignChar(c) => {
                if let Some(assign) = self.state.assign.as_mut() {
                    assign.path_input.push(c);
                }
                vec![]
            }
            InputEvent::AssignBackspace => {
                if let Some(assign) = self.state.assign.as_mut() {
                    assign.path_input.pop();
                }
                vec![]
            }
            InputEvent::AssignSubmit => self.submit_assign(),
            InputEvent::AssignCancel => {
                self.state.assign = None;
                vec![]
            }

            InputEvent::Quit => vec![],
        }
    }

    // Fire due decays and long presses
    pub fn tick(&mut self, now: Instant) {
        let (due, pending): (Vec<Decay>, Vec<Decay>) = self.decays.iter().partition(|d| d.due <= now);
        self.decays = pending;
        for decay in due {
            if let Some(pad) = self.state.pad_mut(decay.pad) {
                pad.is_active = false;
            }
        }

        if let Some(hold) = self.hold.as_mut() {
            let still_held = self.state.pad(hold.pad).is_some_and(|p| p.is_pressed);
            if !hold.fired && still_held && now.duration_since(hold.since) >= LONG_PRESS {
                hold.fired = true;
                let pad = hold.pad;
                self.open_assign(pad);
            }
        }
    }

    pub fn on_decode_complete(&mut self, done: DecodeResult) -> Vec<Command> {
        let DecodeResult { request, result } = done;
        if request.generation != self.state.generation {
            log::info!("discarding decode of {} for a grid that no longer exists", request.path.display());
            return vec![];
        }

        match result {
            Ok(buffer) => {
                let Some(pad) = self.state.pad_mut(request.pad) else {
                    return vec![];
                };
                let seconds = buffer.duration_secs();
                let cmd = self.bank.register_custom(buffer, pad);
                log::info!(
                    "{} (note {}) now plays {} as {} ({seconds:.2}s)",
                    pad.id,
                    pad.note,
                    request.path.display(),
                    pad.sound_id
                );
                if self.state.assign.as_ref().is_some_and(|a| a.pad == request.pad) {
                    self.state.assign = None;
                }
                vec![Command::Audio(cmd)]
            }
            Err(e) => {
                if let Some(assign) = self.state.assign.as_mut().filter(|a| a.pad == request.pad) {
                    assign.decoding = false;
                }
                self.state.set_error(format!("Could not load {}: {e}", request.path.display()));
                vec![]
            }
        }
    }

    // Fresh device list from enumeration. Drops a selection whose device
    // went away and reattaches it (or the preferred input) when it returns.
    pub fn set_devices(&mut self, devices: Vec<MidiDevice>) -> Vec<Command> {
        let previous = std::mem::replace(&mut self.state.devices, devices);
        let mut cmds = Vec::new();

        if let Some(id) = self.state.config.selected_input_id.clone() {
            if self.state.devices.iter().any(|d| d.id == id) {
                return cmds;
            }
            let lost = previous
                .into_iter()
                .find(|d| d.id == id)
                .unwrap_or_else(|| MidiDevice { name: id.clone(), id, manufacturer: None });
            log::warn!("MIDI input {} was disconnected", lost.name);
            self.state.config.selected_input_id = None;
            self.lost_input = Some(lost);
            cmds.push(Command::SelectMidiInput(None));
        }

        // replugged devices may come back under a new port id
        let returning = self.lost_input.as_ref().and_then(|lost| {
            self.state
                .devices
                .iter()
                .find(|d| d.id == lost.id)
                .or_else(|| self.state.devices.iter().find(|d| d.name == lost.name))
        });
        let preferred = self.preferred_input.as_deref().map(str::to_lowercase).and_then(|fragment| {
            self.state.devices.iter().find(|d| d.name.to_lowercase().contains(&fragment))
        });
        if let Some(device) = returning.or(preferred) {
            log::info!("auto-selecting MIDI input {}", device.name);
            let id = device.id.clone();
            self.state.config.selected_input_id = Some(id.clone());
            self.lost_input = None;
            cmds.push(Command::SelectMidiInput(Some(id)));
        }
        cmds
    }

    pub fn set_midi_available(&mut self, available: bool) {
        self.state.midi_available = available;
    }

    // Selection failed on the platform side; fall back to no device
    pub fn midi_selection_failed(&mut self, message: String) {
        self.state.config.selected_input_id = None;
        self.state.set_error(message);
    }

    pub fn report_error(&mut self, message: impl Into<String>) {
        self.state.set_error(message);
    }

    pub fn display_state(&self) -> DisplayState {
        let scheme = self.state.config.color_scheme;
        let (rows, cols) = self.state.config.grid_size.dims();
        let pads = self
            .state
            .pads
            .iter()
            .map(|pad| PadView {
                id: pad.id,
                note: pad.note,
                row: pad.row,
                col: pad.col,
                color: if pad.is_active { glow_color(pad.color, scheme) } else { pad.color },
                pressed: pad.is_pressed,
                lit: pad.is_active,
                custom: pad.has_custom_sound,
                label: note_label(pad.note, scheme),
            })
            .collect();

        let assign = self.state.assign.as_ref().and_then(|a| {
            let pad = self.state.pad(a.pad)?;
            Some(AssignView {
                pad: a.pad,
                note: pad.note,
                path_input: a.path_input.clone(),
                current_sound: pad.sound_id.to_string(),
                decoding: a.decoding,
            })
        });

        DisplayState {
            rows,
            cols,
            pads,
            color_scheme: scheme,
            grid_size: self.state.config.grid_size,
            midi_label: self.midi_label(),
            error: self.state.error.clone(),
            assign,
        }
    }

    // ── Pad state machine ─────────────────────────────────────────

    // idle/releasing -> held
    fn press(&mut self, id: PadId) -> Option<Command> {
        let pad = self.state.pad_mut(id)?;
        pad.is_pressed = true;
        pad.is_active = true;
        let sound = pad.sound_id;
        self.bank.play(sound).map(Command::Audio)
    }

    // held -> releasing. The decay is queued even if a new press lands
    // before it fires; that press stays audible but loses its light early.
    fn release(&mut self, id: PadId, now: Instant) {
        let Some(pad) = self.state.pad_mut(id) else {
            return;
        };
        if !pad.is_pressed {
            return;
        }
        pad.is_pressed = false;
        self.decays.push(Decay { due: now + DECAY, pad: id });
    }

    fn release_all(&mut self, now: Instant) {
        let held: Vec<PadId> = self.state.pads.iter().filter(|p| p.is_pressed).map(|p| p.id).collect();
        for id in held {
            self.release(id, now);
        }
    }

    fn handle_note(&mut self, event: NoteEvent, now: Instant) -> Vec<Command> {
        let Some(pad) = self.state.pad_for_note(event.note()) else {
            return vec![];
        };
        match event {
            NoteEvent::Press { note, velocity } => {
                log::trace!("midi press {note} velocity {velocity}");
                self.press(pad).into_iter().collect()
            }
            NoteEvent::Release { .. } => {
                self.release(pad, now);
                vec![]
            }
        }
    }

    // ── Configuration ─────────────────────────────────────────────

    fn rebuild_grid(&mut self) -> Vec<Command> {
        let config = &self.state.config;
        self.state.pads = build_grid(config.grid_size, config.color_scheme);
        self.state.generation += 1;
        self.state.assign = None;
        self.decays.clear();
        self.hold = None;
        log::info!(
            "grid rebuilt: {} ({} pads, {} sounds in bank)",
            config.grid_size.tag(),
            self.state.pads.len(),
            self.bank.len()
        );
        self.register_default_sounds()
    }

    fn cycle_midi_input(&mut self) -> Vec<Command> {
        if !self.state.midi_available {
            self.state.set_error("MIDI is not available on this system");
            return vec![];
        }
        let devices = &self.state.devices;
        let current = self
            .state
            .config
            .selected_input_id
            .as_ref()
            .and_then(|id| devices.iter().position(|d| &d.id == id));
        let next = match current {
            None => devices.first(),
            Some(i) => devices.get(i + 1),
        }
        .map(|d| d.id.clone());

        self.state.config.selected_input_id = next.clone();
        self.lost_input = None;
        vec![Command::SelectMidiInput(next)]
    }

    fn midi_label(&self) -> String {
        if !self.state.midi_available {
            return "unavailable".to_string();
        }
        match &self.state.config.selected_input_id {
            None => match &self.lost_input {
                Some(lost) => format!("{} (disconnected)", lost.name),
                None => "none".to_string(),
            },
            Some(id) => self
                .state
                .devices
                .iter()
                .find(|d| &d.id == id)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| id.clone()),
        }
    }

    // ── Sound assignment ──────────────────────────────────────────

    fn open_assign(&mut self, pad: PadId) {
        if self.state.pad(pad).is_none() {
            return;
        }
        self.state.assign = Some(AssignRequest { pad, path_input: String::new(), decoding: false });
    }

    fn submit_assign(&mut self) -> Vec<Command> {
        let Some(assign) = self.state.assign.as_ref() else {
            return vec![];
        };
        let raw = assign.path_input.trim();
        if raw.is_empty() {
            self.state.set_error("Choose a file first");
            return vec![];
        }
        let path = PathBuf::from(raw);
        let pad = assign.pad;

        if let Err(e) = check_audio_file(&path) {
            self.state.set_error(e.to_string());
            return vec![];
        }

        if let Some(assign) = self.state.assign.as_mut() {
            assign.decoding = true;
        }
        vec![Command::Decode(DecodeRequest {
            pad,
            path,
            generation: self.state.generation,
            target_rate: self.bank.sample_rate(),
        })]
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::audio::{SampleBuffer, SoundId, StereoFrame};
    use crate::error::SoundLoadError;
    use crate::pipeline::project::Configuration;
    use crate::shared::{ColorScheme, GridSize};

    const RATE: u32 = 8_000;

    fn middle() -> Middle {
        let mut m = Middle::with_state(AppState::default(), RATE);
        m.register_default_sounds();
        m
    }

    fn pad_for(m: &Middle, note: u8) -> PadId {
        m.state.pad_for_note(note).unwrap()
    }

    fn flags(m: &Middle, note: u8) -> (bool, bool) {
        let pad = m.state.pad(pad_for(m, note)).unwrap();
        (pad.is_pressed, pad.is_active)
    }

    fn plays(cmds: &[Command]) -> Vec<SoundId> {
        cmds.iter()
            .filter_map(|c| match c {
                Command::Audio(AudioCommand::Play(id)) => Some(*id),
                _ => None,
            })
            .collect()
    }

    fn press(note: u8) -> InputEvent {
        InputEvent::Midi(NoteEvent::Press { note, velocity: 100 })
    }

    fn release(note: u8) -> InputEvent {
        InputEvent::Midi(NoteEvent::Release { note })
    }

    fn tiny_buffer() -> SampleBuffer {
        SampleBuffer { data: vec![StereoFrame::mono(0.2); 16], sample_rate: RATE }
    }

    #[test]
    fn default_grid_registers_a_tone_per_pad() {
        let mut m = Middle::with_state(AppState::default(), RATE);
        let cmds = m.register_default_sounds();
        assert_eq!(cmds.len(), 16);
        assert!(cmds.iter().all(|c| matches!(c, Command::Audio(AudioCommand::RegisterSample { .. }))));
    }

    #[test]
    fn press_release_decay_cycle() {
        // 5x5 spans notes 36..=60
        let mut m = Middle::with_state(AppState::new(Configuration { grid_size: GridSize::G5x5, ..Default::default() }), RATE);
        m.register_default_sounds();
        let t0 = Instant::now();

        let cmds = m.handle_input(press(60), t0);
        assert_eq!(plays(&cmds), vec![SoundId::default_for(60)]);
        assert_eq!(flags(&m, 60), (true, true));

        m.handle_input(release(60), t0 + Duration::from_millis(30));
        assert_eq!(flags(&m, 60), (false, true));

        m.tick(t0 + Duration::from_millis(129));
        assert_eq!(flags(&m, 60), (false, true));

        m.tick(t0 + Duration::from_millis(130));
        assert_eq!(flags(&m, 60), (false, false));
    }

    #[test]
    fn press_while_releasing_reenters_held() {
        let mut m = middle();
        let t0 = Instant::now();
        m.handle_input(press(40), t0);
        m.handle_input(release(40), t0);
        m.tick(t0 + Duration::from_millis(50));

        let cmds = m.handle_input(press(40), t0 + Duration::from_millis(50));
        assert_eq!(plays(&cmds).len(), 1);
        assert_eq!(flags(&m, 40), (true, true));
    }

    #[test]
    fn stale_decay_still_clears_light_after_repress() {
        let mut m = middle();
        let t0 = Instant::now();
        m.handle_input(press(40), t0);
        m.handle_input(release(40), t0);
        m.handle_input(press(40), t0 + Duration::from_millis(50));
        m.tick(t0 + Duration::from_millis(100));
        assert_eq!(flags(&m, 40), (true, false));
    }

    #[test]
    fn notes_outside_the_grid_are_ignored() {
        let mut m = middle();
        let t0 = Instant::now();
        assert!(m.handle_input(press(20), t0).is_empty());
        assert!(m.handle_input(press(52), t0).is_empty());
        assert!(m.state.pads.iter().all(|p| !p.is_pressed));
    }

    #[test]
    fn release_of_idle_pad_does_nothing() {
        let mut m = middle();
        let t0 = Instant::now();
        m.handle_input(release(36), t0);
        m.tick(t0 + Duration::from_secs(1));
        assert_eq!(flags(&m, 36), (false, false));
        assert!(m.decays.is_empty());
    }

    #[test]
    fn pointer_up_releases_every_held_pad() {
        let mut m = middle();
        let t0 = Instant::now();
        m.handle_input(press(36), t0);
        m.handle_input(press(37), t0);
        m.handle_input(InputEvent::PointerDown(pad_for(&m, 50)), t0);

        m.handle_input(InputEvent::PointerReleased, t0);
        for note in [36, 37, 50] {
            assert_eq!(flags(&m, note), (false, true));
        }
        m.tick(t0 + DECAY);
        for note in [36, 37, 50] {
            assert_eq!(flags(&m, note), (false, false));
        }
    }

    #[test]
    fn four_by_four_pointer_scenario() {
        let mut m = Middle::with_state(AppState::new(Configuration { grid_size: GridSize::G4x4, ..Default::default() }), RATE);
        m.register_default_sounds();
        let notes: Vec<u8> = m.state.pads.iter().map(|p| p.note).collect();
        assert_eq!(notes, (36..=51).collect::<Vec<u8>>());

        // note 36 is drawn bottom-left
        let bottom_left = m.state.pad_at(3, 0).unwrap();
        assert_eq!(m.state.pad(bottom_left).unwrap().note, 36);

        let t0 = Instant::now();
        let cmds = m.handle_input(InputEvent::PointerDown(bottom_left), t0);
        assert_eq!(plays(&cmds), vec![SoundId::default_for(36)]);
        assert_eq!(flags(&m, 36), (true, true));

        m.handle_input(InputEvent::PointerReleased, t0 + Duration::from_millis(200));
        assert_eq!(flags(&m, 36), (false, true));
        m.tick(t0 + Duration::from_millis(300));
        assert_eq!(flags(&m, 36), (false, false));
    }

    #[test]
    fn long_press_opens_assignment_once() {
        let mut m = middle();
        let pad = pad_for(&m, 45);
        let t0 = Instant::now();
        m.handle_input(InputEvent::PointerDown(pad), t0);

        m.tick(t0 + Duration::from_millis(799));
        assert!(m.state.assign.is_none());

        m.tick(t0 + LONG_PRESS);
        assert_eq!(m.state.assign.as_ref().map(|a| a.pad), Some(pad));

        m.handle_input(InputEvent::AssignCancel, t0 + LONG_PRESS);
        m.tick(t0 + Duration::from_millis(2_000));
        assert!(m.state.assign.is_none());
    }

    #[test]
    fn short_press_does_not_open_assignment() {
        let mut m = middle();
        let pad = pad_for(&m, 45);
        let t0 = Instant::now();
        m.handle_input(InputEvent::PointerDown(pad), t0);
        m.handle_input(InputEvent::PointerReleased, t0 + Duration::from_millis(300));
        m.tick(t0 + Duration::from_millis(900));
        assert!(m.state.assign.is_none());
    }

    #[test]
    fn right_click_opens_assignment_without_playing() {
        let mut m = middle();
        let pad = pad_for(&m, 38);
        let cmds = m.handle_input(InputEvent::PadContext(pad), Instant::now());
        assert!(cmds.is_empty());
        assert_eq!(flags(&m, 38), (false, false));
        assert!(m.state.assign.is_some());
    }

    #[test]
    fn non_audio_file_is_rejected_without_decoding() {
        let mut m = middle();
        let t0 = Instant::now();
        m.handle_input(InputEvent::PadContext(pad_for(&m, 38)), t0);
        for c in "notes.txt".chars() {
            m.handle_input(InputEvent::AssignChar(c), t0);
        }
        let cmds = m.handle_input(InputEvent::AssignSubmit, t0);
        assert!(cmds.is_empty());
        assert!(m.state.error.as_deref().unwrap().contains("not an audio file"));
        assert!(m.state.assign.is_some());
    }

    #[test]
    fn submit_audio_path_requests_decode() {
        let mut m = middle();
        let t0 = Instant::now();
        let pad = pad_for(&m, 38);
        m.handle_input(InputEvent::PadContext(pad), t0);
        for c in "kick.wavx".chars() {
            m.handle_input(InputEvent::AssignChar(c), t0);
        }
        m.handle_input(InputEvent::AssignBackspace, t0);
        let cmds = m.handle_input(InputEvent::AssignSubmit, t0);
        match cmds.as_slice() {
            [Command::Decode(req)] => {
                assert_eq!(req.pad, pad);
                assert_eq!(req.path, PathBuf::from("kick.wav"));
                assert_eq!(req.generation, m.state.generation);
                assert_eq!(req.target_rate, RATE);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(m.state.assign.as_ref().unwrap().decoding);
    }

    #[test]
    fn successful_decode_rebinds_pad() {
        let mut m = middle();
        let t0 = Instant::now();
        let pad = pad_for(&m, 42);
        m.handle_input(InputEvent::PadContext(pad), t0);
        let request = DecodeRequest { pad, path: "snare.wav".into(), generation: 0, target_rate: RATE };

        let cmds = m.on_decode_complete(DecodeResult { request, result: Ok(tiny_buffer()) });
        let new_id = match cmds.as_slice() {
            [Command::Audio(AudioCommand::RegisterSample { id, .. })] => *id,
            other => panic!("unexpected {other:?}"),
        };
        let p = m.state.pad(pad).unwrap();
        assert!(p.has_custom_sound);
        assert_eq!(p.sound_id, new_id);
        assert!(m.state.assign.is_none());

        let cmds = m.handle_input(press(42), t0);
        assert_eq!(plays(&cmds), vec![new_id]);
    }

    #[test]
    fn failed_decode_leaves_pad_untouched() {
        let mut m = middle();
        let t0 = Instant::now();
        let pad = pad_for(&m, 42);
        m.handle_input(InputEvent::PadContext(pad), t0);
        let request = DecodeRequest { pad, path: "broken.wav".into(), generation: 0, target_rate: RATE };

        let cmds = m.on_decode_complete(DecodeResult { request, result: Err(SoundLoadError::Empty) });
        assert!(cmds.is_empty());
        let p = m.state.pad(pad).unwrap();
        assert_eq!(p.sound_id, SoundId::default_for(42));
        assert!(!p.has_custom_sound);
        assert!(m.state.error.as_deref().unwrap().contains("broken.wav"));
        let assign = m.state.assign.as_ref().unwrap();
        assert!(!assign.decoding);
    }

    #[test]
    fn failed_decode_keeps_other_pads_modal_decoding() {
        let mut m = middle();
        let t0 = Instant::now();
        let first = pad_for(&m, 36);
        let second = pad_for(&m, 37);
        m.handle_input(InputEvent::PadContext(second), t0);
        for c in "hat.wav".chars() {
            m.handle_input(InputEvent::AssignChar(c), t0);
        }
        m.handle_input(InputEvent::AssignSubmit, t0);

        let request = DecodeRequest { pad: first, path: "old.wav".into(), generation: 0, target_rate: RATE };
        m.on_decode_complete(DecodeResult { request, result: Err(SoundLoadError::Empty) });
        let assign = m.state.assign.as_ref().unwrap();
        assert_eq!(assign.pad, second);
        assert!(assign.decoding);
        assert!(m.state.error.is_some());
    }

    #[test]
    fn latest_error_wins_and_can_be_dismissed() {
        let mut m = middle();
        m.report_error("first");
        m.report_error("second");
        assert_eq!(m.state.error.as_deref(), Some("second"));
        m.handle_input(InputEvent::DismissError, Instant::now());
        assert!(m.state.error.is_none());
    }

    #[test]
    fn grid_change_discards_custom_sounds() {
        let mut m = middle();
        let t0 = Instant::now();
        let pad = pad_for(&m, 36);
        let request = DecodeRequest { pad, path: "a.wav".into(), generation: 0, target_rate: RATE };
        m.on_decode_complete(DecodeResult { request, result: Ok(tiny_buffer()) });
        assert!(m.state.pad(pad).unwrap().has_custom_sound);

        let cmds = m.handle_input(InputEvent::CycleGridSize, t0);
        assert_eq!(m.state.config.grid_size, GridSize::G5x5);
        assert_eq!(m.state.pads.len(), 25);
        assert_eq!(cmds.len(), 25);
        assert!(m.state.pads.iter().all(|p| !p.has_custom_sound && p.sound_id == SoundId::default_for(p.note)));

        let cmds = m.handle_input(press(60), t0);
        assert_eq!(plays(&cmds), vec![SoundId::default_for(60)]);
    }

    #[test]
    fn decode_for_previous_grid_is_discarded() {
        let mut m = middle();
        let t0 = Instant::now();
        let pad = pad_for(&m, 36);
        m.handle_input(InputEvent::CycleGridSize, t0);
        let request = DecodeRequest { pad, path: "late.wav".into(), generation: 0, target_rate: RATE };
        assert!(m.on_decode_complete(DecodeResult { request, result: Ok(tiny_buffer()) }).is_empty());
        assert!(m.state.pads.iter().all(|p| !p.has_custom_sound));
    }

    #[test]
    fn scheme_change_recolors_and_glow_shows_when_lit() {
        let mut m = middle();
        let t0 = Instant::now();
        while m.state.config.color_scheme != ColorScheme::MusicTheory {
            m.handle_input(InputEvent::CycleColorScheme, t0);
        }
        let root = m.state.pad(pad_for(&m, 48)).unwrap();
        assert_eq!(root.color.to_string(), "#FF5252");

        while m.state.config.color_scheme != ColorScheme::Rainbow {
            m.handle_input(InputEvent::CycleColorScheme, t0);
        }
        m.handle_input(press(48), t0);
        let view = m.display_state();
        let lit = view.pads.iter().find(|p| p.note == 48).unwrap();
        assert!(lit.lit);
        assert!(lit.color.to_string().ends_with("100%, 70%)"));
    }

    #[test]
    fn midi_cycle_walks_devices_then_none() {
        let mut m = middle();
        let t0 = Instant::now();

        assert!(m.handle_input(InputEvent::CycleMidiInput, t0).is_empty());
        assert!(m.state.error.is_some());

        m.set_midi_available(true);
        m.set_devices(vec![
            MidiDevice { id: "a".into(), name: "Pad A".into(), manufacturer: None },
            MidiDevice { id: "b".into(), name: "Pad B".into(), manufacturer: None },
        ]);
        let picks: Vec<Option<String>> = (0..3)
            .map(|_| match m.handle_input(InputEvent::CycleMidiInput, t0).as_slice() {
                [Command::SelectMidiInput(id)] => id.clone(),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(picks, vec![Some("a".into()), Some("b".into()), None]);
        assert_eq!(m.display_state().midi_label, "none");
    }

    #[test]
    fn preferred_input_is_auto_selected_when_it_appears() {
        let mut m = middle();
        m.set_midi_available(true);
        m.set_preferred_input(Some("launch".into()));
        assert!(m.set_devices(vec![]).is_empty());

        let cmds = m.set_devices(vec![MidiDevice { id: "20:0".into(), name: "Launchpad Mini".into(), manufacturer: None }]);
        assert!(matches!(cmds.as_slice(), [Command::SelectMidiInput(Some(id))] if id == "20:0"));
        assert_eq!(m.display_state().midi_label, "Launchpad Mini");
    }

    fn device(id: &str, name: &str) -> MidiDevice {
        MidiDevice { id: id.into(), name: name.into(), manufacturer: None }
    }

    fn selections(cmds: &[Command]) -> Vec<Option<String>> {
        cmds.iter()
            .filter_map(|c| match c {
                Command::SelectMidiInput(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn unplugged_input_reconnects_when_it_returns() {
        let mut m = middle();
        let t0 = Instant::now();
        m.set_midi_available(true);
        m.set_devices(vec![device("a", "Pad A")]);
        m.handle_input(InputEvent::CycleMidiInput, t0);
        assert_eq!(m.state.config.selected_input_id.as_deref(), Some("a"));

        let cmds = m.set_devices(vec![]);
        assert_eq!(selections(&cmds), vec![None]);
        assert!(m.state.config.selected_input_id.is_none());
        assert_eq!(m.display_state().midi_label, "Pad A (disconnected)");

        // same device, new port id
        let cmds = m.set_devices(vec![device("a2", "Pad A")]);
        assert_eq!(selections(&cmds), vec![Some("a2".to_string())]);
        assert_eq!(m.state.config.selected_input_id.as_deref(), Some("a2"));
        assert_eq!(m.display_state().midi_label, "Pad A");
    }

    #[test]
    fn unplugged_preferred_input_is_selected_again() {
        let mut m = middle();
        m.set_midi_available(true);
        m.set_preferred_input(Some("launch".into()));
        m.set_devices(vec![device("20:0", "Launchpad Mini")]);

        assert_eq!(selections(&m.set_devices(vec![device("x", "Other")])), vec![None]);
        let cmds = m.set_devices(vec![device("24:0", "Launchpad Mini MK3")]);
        assert_eq!(selections(&cmds), vec![Some("24:0".to_string())]);
    }

    #[test]
    fn manual_choice_forgets_a_lost_input() {
        let mut m = middle();
        let t0 = Instant::now();
        m.set_midi_available(true);
        m.set_devices(vec![device("a", "Pad A")]);
        m.handle_input(InputEvent::CycleMidiInput, t0);
        m.set_devices(vec![device("b", "Pad B")]);

        // b, then past the end to none
        m.handle_input(InputEvent::CycleMidiInput, t0);
        m.handle_input(InputEvent::CycleMidiInput, t0);
        assert_eq!(m.display_state().midi_label, "none");
        assert!(m.set_devices(vec![device("a", "Pad A"), device("b", "Pad B")]).is_empty());
    }
}
