//! Audio output using cpal and a ring buffer
//!
//! The host hardware pushes each committed tick of 8-bit FIFO samples; they
//! are resampled to the device rate and drained by the cpal callback.

use anyhow::{Context, Result, bail};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    HeapRb,
    traits::{Consumer, Producer, Split},
};
use tracing::{debug, error};

/// Ring buffer length in milliseconds of device audio
const RING_BUFFER_MS: usize = 100;

/// Streaming linear interpolator between two fixed rates
#[derive(Debug, Clone)]
pub struct LinearResampler {
    /// Input samples advanced per output sample
    step: f64,
    /// Position between `prev` and the next input sample, in `[0, 1)`
    phase: f64,
    prev: f32,
}

impl LinearResampler {
    pub fn new(input_rate: f64, output_rate: f64) -> Self {
        Self {
            step: input_rate / output_rate,
            phase: 0.0,
            prev: 0.0,
        }
    }

    /// Resample `input`, appending to `output`
    pub fn process(&mut self, input: &[f32], output: &mut Vec<f32>) {
        for &next in input {
            while self.phase < 1.0 {
                output.push(self.prev + (next - self.prev) * self.phase as f32);
                self.phase += self.step;
            }
            self.phase -= 1.0;
            self.prev = next;
        }
    }
}

/// Audio output using cpal and ring buffer
pub struct AudioOutput {
    producer: ringbuf::HeapProd<f32>,
    _stream: cpal::Stream,
    resampler: LinearResampler,
    channels: usize,
    volume: f32,
    mono: Vec<f32>,
    resampled: Vec<f32>,
    interleaved: Vec<f32>,
}

impl AudioOutput {
    /// Open the default output device for a source at `source_rate`
    pub fn new(source_rate: f64, volume: f32) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .context("No audio output device available")?;

        let config = device
            .default_output_config()
            .context("Failed to get default output config")?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        let capacity = sample_rate as usize * channels * RING_BUFFER_MS / 1000;
        let ring = HeapRb::<f32>::new(capacity);
        let (producer, mut consumer) = ring.split();

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                let config = config.into();
                device
                    .build_output_stream(
                        &config,
                        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                            let popped = consumer.pop_slice(data);
                            data[popped..].fill(0.0);
                        },
                        |err| error!("Audio stream error: {}", err),
                        None,
                    )
                    .context("Failed to build F32 audio stream")?
            }
            cpal::SampleFormat::I16 => {
                let config = config.into();
                let mut temp_buffer: Vec<f32> = vec![0.0; 4096];
                device
                    .build_output_stream(
                        &config,
                        move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                            if temp_buffer.len() < data.len() {
                                temp_buffer.resize(data.len(), 0.0);
                            }
                            let popped = consumer.pop_slice(&mut temp_buffer[..data.len()]);
                            for (out, &f) in data.iter_mut().zip(&temp_buffer[..popped]) {
                                *out = (f * 32767.0).clamp(-32768.0, 32767.0) as i16;
                            }
                            data[popped..].fill(0);
                        },
                        |err| error!("Audio stream error: {}", err),
                        None,
                    )
                    .context("Failed to build I16 audio stream")?
            }
            cpal::SampleFormat::U16 => {
                let config = config.into();
                let mut temp_buffer: Vec<f32> = vec![0.0; 4096];
                device
                    .build_output_stream(
                        &config,
                        move |data: &mut [u16], _: &cpal::OutputCallbackInfo| {
                            if temp_buffer.len() < data.len() {
                                temp_buffer.resize(data.len(), 0.0);
                            }
                            let popped = consumer.pop_slice(&mut temp_buffer[..data.len()]);
                            for (out, &f) in data.iter_mut().zip(&temp_buffer[..popped]) {
                                *out = (f * 32767.0 + 32768.0).clamp(0.0, 65535.0) as u16;
                            }
                            // 0x8000 is silence for u16 audio
                            data[popped..].fill(32768);
                        },
                        |err| error!("Audio stream error: {}", err),
                        None,
                    )
                    .context("Failed to build U16 audio stream")?
            }
            format => bail!("Unsupported sample format: {:?}", format),
        };

        stream.play().context("Failed to start audio stream")?;

        debug!(
            "Audio stream started: {} Hz, {} channels, {} sample ring",
            sample_rate, channels, capacity
        );

        Ok(Self {
            producer,
            _stream: stream,
            resampler: LinearResampler::new(source_rate, sample_rate as f64),
            channels,
            volume,
            mono: Vec::new(),
            resampled: Vec::new(),
            interleaved: Vec::new(),
        })
    }

    /// Queue one tick of signed 8-bit FIFO samples
    pub fn push_fifo(&mut self, samples: &[i8]) {
        self.mono.clear();
        self.mono
            .extend(samples.iter().map(|&s| s as f32 / 128.0 * self.volume));

        self.resampled.clear();
        self.resampler.process(&self.mono, &mut self.resampled);

        self.interleaved.clear();
        for &s in &self.resampled {
            self.interleaved
                .extend(std::iter::repeat_n(s, self.channels));
        }

        let pushed = self.producer.push_slice(&self.interleaved);
        if pushed < self.interleaved.len() {
            debug!(
                "Audio buffer overflow: dropped {} samples",
                self.interleaved.len() - pushed
            );
        }
    }
}
