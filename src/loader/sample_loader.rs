use std::fs::File;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use symphonia::core::{
    audio::SampleBuffer as SymphoniaSampleBuffer, codecs::DecoderOptions,
    errors::Error as SymphoniaError, formats::FormatOptions, io::MediaSourceStream,
    meta::MetadataOptions, probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};

use crate::audio::SampleBuffer;
use crate::error::SoundLoadError;
use crate::shared::PadId;

// A user file headed for a pad. `generation` ties it to the grid it was
// requested from.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeRequest {
    pub pad: PadId,
    pub path: PathBuf,
    pub generation: u64,
    pub target_rate: u32,
}

#[derive(Debug)]
pub struct DecodeResult {
    pub request: DecodeRequest,
    pub result: Result<SampleBuffer, SoundLoadError>,
}

// Decodes off the UI thread; completions are polled from the main loop.
pub struct SoundLoader {
    tx: Sender<DecodeResult>,
    rx: Receiver<DecodeResult>,
}

impl SoundLoader {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    pub fn submit(&self, request: DecodeRequest) {
        let tx = self.tx.clone();
        log::debug!("decoding {} for {}", request.path.display(), request.pad);
        let spawned = thread::Builder::new()
            .name("padgrid-decode".into())
            .spawn(move || {
                let result = decode_file(&request.path, request.target_rate);
                let _ = tx.send(DecodeResult { request, result });
            });
        if let Err(e) = spawned {
            log::error!("could not spawn decode thread: {e}");
        }
    }

    pub fn poll_completed(&self) -> Option<DecodeResult> {
        self.rx.try_recv().ok()
    }
}

// MIME type from the file extension, the way a file picker would report it
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "wav" | "wave" => "audio/wav",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "ogg" | "oga" => "audio/ogg",
        "aif" | "aiff" => "audio/aiff",
        "txt" | "md" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

// Only audio/* gets as far as a decode attempt
pub fn check_audio_file(path: &Path) -> Result<(), SoundLoadError> {
    let mime = mime_for_path(path);
    if mime.starts_with("audio/") {
        Ok(())
    } else {
        Err(SoundLoadError::UnsupportedFileType { path: path.display().to_string(), mime: mime.to_string() })
    }
}

pub fn decode_file(path: &Path, target_rate: u32) -> Result<SampleBuffer, SoundLoadError> {
    check_audio_file(path)?;
    if mime_for_path(path) == "audio/wav" {
        return SampleBuffer::load_wav(path, target_rate);
    }
    decode_with_symphonia(path, target_rate)
}

fn decode_with_symphonia(path: &Path, target_rate: u32) -> Result<SampleBuffer, SoundLoadError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format.default_track().ok_or(SoundLoadError::NoDefaultTrack)?;
    let track_id = track.id;
    let file_rate = track.codec_params.sample_rate.ok_or(SoundLoadError::MissingSampleRate)?;
    let channels = track
        .codec_params
        .channels
        .ok_or(SoundLoadError::MissingChannels)?
        .count();

    let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut decoded: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(SoundLoadError::Decode(err)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let audio_buf = decoder.decode(&packet)?;
        let spec = *audio_buf.spec();
        let duration = audio_buf.capacity() as u64;

        let mut sample_buf = SymphoniaSampleBuffer::<f32>::new(duration, spec);
        sample_buf.copy_interleaved_ref(audio_buf);
        decoded.extend_from_slice(sample_buf.samples());
    }

    SampleBuffer::from_interleaved(&decoded, channels, file_rate, target_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn scratch_file(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn non_audio_types_are_rejected_before_decoding() {
        let file = scratch_file(".txt", b"hello");
        let err = decode_file(file.path(), 44_100).unwrap_err();
        assert!(matches!(err, SoundLoadError::UnsupportedFileType { ref mime, .. } if mime == "text/plain"));
        assert!(check_audio_file(Path::new("kick.WAV")).is_ok());
        assert!(check_audio_file(Path::new("kick")).is_err());
    }

    #[test]
    fn garbage_wav_fails_to_decode() {
        let file = scratch_file(".wav", b"definitely not RIFF data");
        assert!(matches!(decode_file(file.path(), 44_100), Err(SoundLoadError::Wav(_))));
    }

    #[test]
    fn garbage_mp3_fails_to_decode() {
        let file = scratch_file(".mp3", &[0u8; 64]);
        assert!(decode_file(file.path(), 44_100).is_err());
    }

    #[test]
    fn wav_round_trip_through_hound() {
        let file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(file.path(), spec).unwrap();
        for i in 0..100 {
            writer.write_sample((i * 100) as i16).unwrap();
        }
        writer.finalize().unwrap();

        let buf = decode_file(file.path(), 44_100).unwrap();
        assert_eq!(buf.data.len(), 200);
        assert_eq!(buf.data[0].left, buf.data[0].right);
    }

    #[test]
    fn loader_reports_failures_through_the_channel() {
        let file = scratch_file(".wav", b"nope");
        let loader = SoundLoader::new();
        let request = DecodeRequest { pad: PadId(3), path: file.path().to_path_buf(), generation: 7, target_rate: 44_100 };
        loader.submit(request.clone());

        let done = loader.rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert_eq!(done.request, request);
        assert!(done.result.is_err());
    }
}
