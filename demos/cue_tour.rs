//! Interactive tour of the cue palette.
//!
//! Number keys (and `-`) trigger each cue.
//! Press Q or ESC to quit.

use std::io::{Write, stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use chime::{Cue, CueEngine, Signal, SynthFactory, SynthMixer};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, StreamConfig};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};

const KEYS: [(char, Cue); 11] = [
    ('1', Cue::Success),
    ('2', Cue::CardReveal),
    ('3', Cue::Hover),
    ('4', Cue::Click),
    ('5', Cue::Confetti),
    ('6', Cue::Whoosh),
    ('7', Cue::Warning),
    ('8', Cue::Compliance),
    ('9', Cue::Navigation),
    ('0', Cue::Expand),
    ('-', Cue::Collapse),
];

fn run_audio_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut mixer: SynthMixer,
) -> Result<cpal::Stream>
where
    T: Sample + FromSample<f64> + cpal::SizedSample,
{
    let channels = config.channels as usize;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let sample = mixer.next_sample();
                let value: T = T::from_sample(sample);
                for s in frame.iter_mut() {
                    *s = value;
                }
            }
        },
        |err| eprintln!("Audio stream error: {}", err),
        None,
    )?;

    stream.play()?;
    Ok(stream)
}

fn draw_ui(last: Option<Cue>) -> Result<()> {
    let mut stdout = stdout();

    stdout.execute(crossterm::terminal::Clear(
        crossterm::terminal::ClearType::All,
    ))?;
    stdout.execute(crossterm::cursor::MoveTo(0, 0))?;

    write!(stdout, "Cue tour | Q=quit")?;
    for (row, (key, cue)) in KEYS.iter().enumerate() {
        stdout.execute(crossterm::cursor::MoveTo(0, row as u16 + 2))?;
        write!(stdout, "  {} -> {}", key, cue.name())?;
    }
    stdout.execute(crossterm::cursor::MoveTo(0, KEYS.len() as u16 + 3))?;
    match last {
        Some(cue) => write!(stdout, "Playing: {}", cue.name())?,
        None => write!(stdout, "Press a key to play a cue")?,
    }

    stdout.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    // Setup audio
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("No output device available"))?;

    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate().0 as f64;

    let factory = SynthFactory::new(sample_rate);
    let mixer = factory.mixer();
    let mut engine = CueEngine::new(factory);

    // Start audio stream
    let _stream = match config.sample_format() {
        SampleFormat::F32 => run_audio_stream::<f32>(&device, &config.into(), mixer)?,
        SampleFormat::I16 => run_audio_stream::<i16>(&device, &config.into(), mixer)?,
        SampleFormat::U16 => run_audio_stream::<u16>(&device, &config.into(), mixer)?,
        sample_format => {
            return Err(anyhow::anyhow!(
                "Unsupported sample format: {}",
                sample_format
            ));
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(crossterm::cursor::Hide)?;

    draw_ui(None)?;

    // Event loop: keys trigger cues, the engine advances on wall time.
    let mut clock = Instant::now();
    loop {
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(KeyEvent { code, .. }) = event::read()? {
                match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => break,
                    KeyCode::Char(c) => {
                        if let Some((_, cue)) = KEYS.iter().find(|(key, _)| *key == c) {
                            engine.trigger(*cue);
                            draw_ui(Some(*cue))?;
                        }
                    }
                    _ => {}
                }
            }
        }
        engine.advance(clock.elapsed());
        clock = Instant::now();
    }

    // Cleanup terminal
    stdout().execute(crossterm::cursor::Show)?;
    stdout().execute(LeaveAlternateScreen)?;
    disable_raw_mode()?;

    Ok(())
}
