mod audio;
mod audio_api;
mod config;
mod error;
mod loader;
mod middle;
mod midi;
mod pipeline;
mod shared;
mod tui;

use std::fs::File;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use audio::AudioHandle;
use config::Config;
use loader::sample_loader::SoundLoader;
use middle::{Command, Middle};
use midi::MidiInputManager;
use pipeline::project::AppState;
use shared::InputEvent;

const PORT_SCAN_INTERVAL: Duration = Duration::from_secs(1);

fn main() {
    if let Err(e) = run() {
        log::error!("fatal: {e:#}");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

struct Args {
    verbose: bool,
    config: Option<PathBuf>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("usage: padgrid [--verbose|-v] [--config <path>]");
        std::process::exit(0);
    }
    Args {
        verbose: args.iter().any(|a| a == "--verbose" || a == "-v"),
        config: args
            .iter()
            .position(|a| a == "--config")
            .and_then(|i| args.get(i + 1))
            .map(PathBuf::from),
    }
}

fn init_logging() {
    use simplelog::{LevelFilter, WriteLogger};

    let log_path = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("padgrid")
        .join("padgrid.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = match File::create(&log_path) {
        Ok(file) => file,
        Err(_) => match File::create(std::env::temp_dir().join("padgrid.log")) {
            Ok(file) => file,
            Err(e) => {
                eprintln!("padgrid: logging disabled ({e})");
                return;
            }
        },
    };

    // the level is narrowed with log::set_max_level once the config is read
    if let Err(e) = WriteLogger::init(LevelFilter::Trace, simplelog::Config::default(), log_file) {
        eprintln!("padgrid: logging disabled ({e})");
    }
}

// Everything that talks to the outside world. Dropping it closes the audio
// stream and the MIDI connection.
struct Platform {
    audio: AudioHandle,
    midi: Option<MidiInputManager>,
    loader: SoundLoader,
}

impl Platform {
    fn run_commands(&mut self, middle: &mut Middle, cmds: Vec<Command>) {
        for cmd in cmds {
            match cmd {
                Command::Audio(cmd) => self.audio.send(cmd),
                Command::Decode(request) => self.loader.submit(request),
                Command::SelectMidiInput(id) => {
                    let Some(midi) = self.midi.as_mut() else {
                        continue;
                    };
                    if id.is_some() && midi.connected_id() == id.as_deref() {
                        continue;
                    }
                    if let Err(e) = midi.select(id.as_deref()) {
                        middle.midi_selection_failed(e.to_string());
                    }
                }
            }
        }
    }
}

fn run() -> anyhow::Result<()> {
    let args = parse_args();
    init_logging();
    let config = Config::load(args.config.as_deref());
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        config.log_level().unwrap_or(log::LevelFilter::Info)
    };
    log::set_max_level(level);
    log::info!("padgrid starting (log level: {:?})", level);

    let audio = audio::start_audio()?;
    let mut middle = Middle::with_state(AppState::new(config.configuration()), audio.sample_rate());
    middle.set_preferred_input(config.midi_input());

    let midi = match MidiInputManager::new() {
        Ok(manager) => {
            middle.set_midi_available(true);
            Some(manager)
        }
        Err(e) => {
            middle.set_midi_available(false);
            middle.report_error(e.to_string()); // pointer and keys still play
            None
        }
    };
    let mut platform = Platform { audio, midi, loader: SoundLoader::new() };

    let cmds = middle.register_default_sounds();
    platform.run_commands(&mut middle, cmds);
    if let Some(devices) = platform.midi.as_ref().map(|m| m.devices().to_vec()) {
        let cmds = middle.set_devices(devices);
        platform.run_commands(&mut middle, cmds);
    }

    terminal::enable_raw_mode()?;
    let _guard = TerminalGuard; // auto drops when out of scope
    crossterm::execute!(std::io::stdout(), EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    let mut tui_state = tui::mode::TuiState::default();
    // real press/release detection where the terminal can do it
    tui_state.key_release = terminal::supports_keyboard_enhancement().unwrap_or(false);
    if tui_state.key_release {
        crossterm::execute!(
            std::io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = Duration::from_millis(16); // ~60fps
    let mut last_port_scan = Instant::now();

    loop {
        middle.tick(Instant::now());
        let ds = middle.display_state();
        tui_state.sync(&ds);

        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds, &mut tui_state);
        })?;

        let events = tui::input::poll_input(tick_rate, &mut tui_state)?;
        for event in events {
            if event == InputEvent::Quit {
                log::info!("padgrid quitting");
                return Ok(());
            }
            let cmds = middle.handle_input(event, Instant::now());
            platform.run_commands(&mut middle, cmds);
        }

        let notes = platform.midi.as_ref().map(MidiInputManager::poll_events).unwrap_or_default();
        for note in notes {
            let cmds = middle.handle_input(InputEvent::Midi(note), Instant::now());
            platform.run_commands(&mut middle, cmds);
        }

        while let Some(done) = platform.loader.poll_completed() {
            let cmds = middle.on_decode_complete(done);
            platform.run_commands(&mut middle, cmds);
        }

        // midir has no hotplug callback, so watch the port list instead
        if last_port_scan.elapsed() >= PORT_SCAN_INTERVAL {
            last_port_scan = Instant::now();
            if let Some(midi) = platform.midi.as_mut() {
                if midi.refresh_ports() {
                    let devices = midi.devices().to_vec();
                    let cmds = middle.set_devices(devices);
                    platform.run_commands(&mut middle, cmds);
                }
            }
        }
    }
}

// Single teardown point for the terminal, however run() exits
struct TerminalGuard;
impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(
            std::io::stdout(),
            PopKeyboardEnhancementFlags,
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
