//! Ambient bed steered from the keyboard.
//!
//! S starts the bed, X stops it, arrow keys move a virtual pointer that
//! modulates its filter cutoff (left/right) and level (up/down).
//! Press Q or ESC to quit.

use std::io::{Write, stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use chime::{CueEngine, Signal, SynthFactory, SynthMixer};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, StreamConfig};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};

const EXTENT: f64 = 100.0;
const STEP: f64 = 5.0;

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

fn draw_ui(active: bool, x: f64, y: f64) -> Result<()> {
    let mut stdout = stdout();

    stdout.execute(crossterm::terminal::Clear(
        crossterm::terminal::ClearType::All,
    ))?;
    stdout.execute(crossterm::cursor::MoveTo(0, 0))?;
    write!(stdout, "Ambient bed | S=start X=stop arrows=steer Q=quit")?;

    stdout.execute(crossterm::cursor::MoveTo(0, 2))?;
    write!(
        stdout,
        "bed: {} | pointer: ({:.0}, {:.0}) of {:.0}",
        if active { "on" } else { "off" },
        x,
        y,
        EXTENT
    )?;

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

    let mut x = EXTENT / 2.0;
    let mut y = EXTENT / 2.0;
    draw_ui(false, x, y)?;

    let mut clock = Instant::now();
    loop {
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(KeyEvent { code, .. }) = event::read()? {
                let mut moved = false;
                match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => break,
                    KeyCode::Char('s') | KeyCode::Char('S') => engine.start_ambient(),
                    KeyCode::Char('x') | KeyCode::Char('X') => engine.stop_ambient(),
                    KeyCode::Left => {
                        x = (x - STEP).max(0.0);
                        moved = true;
                    }
                    KeyCode::Right => {
                        x = (x + STEP).min(EXTENT);
                        moved = true;
                    }
                    KeyCode::Up => {
                        y = (y - STEP).max(0.0);
                        moved = true;
                    }
                    KeyCode::Down => {
                        y = (y + STEP).min(EXTENT);
                        moved = true;
                    }
                    _ => {}
                }
                if moved {
                    engine.modulate_ambient(x, y, EXTENT, EXTENT);
                }
                draw_ui(engine.ambient_active(), x, y)?;
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
