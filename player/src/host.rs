//! Host implementation of the handheld hardware
//!
//! A timer thread raises the vertical blank interrupt at the handheld's
//! refresh rate, the keyboard stands in for the key register and committed
//! FIFO buffers go to the audio output.

use anyhow::Result;
use cartvox_core::{
    Buttons, HardwareIo, InterruptFlags, Interrupts, TransferConfig, handheld_specs,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::audio::AudioOutput;

/// Buttons in the key register
const BUTTON_COUNT: usize = 10;

/// What a key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Press(Buttons),
    Quit,
}

fn map_key(key: &KeyEvent) -> Option<KeyAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(KeyAction::Quit);
    }

    let button = match key.code {
        KeyCode::Up => Buttons::UP,
        KeyCode::Down => Buttons::DOWN,
        KeyCode::Left => Buttons::LEFT,
        KeyCode::Right => Buttons::RIGHT,
        KeyCode::Char('x') | KeyCode::Char('X') => Buttons::A,
        KeyCode::Char('z') | KeyCode::Char('Z') => Buttons::B,
        KeyCode::Char('a') | KeyCode::Char('A') => Buttons::L,
        KeyCode::Char('s') | KeyCode::Char('S') => Buttons::R,
        KeyCode::Enter => Buttons::START,
        KeyCode::Backspace | KeyCode::Tab => Buttons::SELECT,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Some(KeyAction::Quit),
        _ => return None,
    };
    Some(KeyAction::Press(button))
}

/// Emulated key register
///
/// Terminals only report presses and auto-repeats, so each press keeps its
/// button down for a fixed number of ticks.
#[derive(Debug)]
struct KeyHold {
    hold_ticks: u32,
    remaining: [u32; BUTTON_COUNT],
}

impl KeyHold {
    fn new(hold_ticks: u32) -> Self {
        Self {
            hold_ticks: hold_ticks.max(1),
            remaining: Default::default(),
        }
    }

    fn press(&mut self, buttons: Buttons) {
        for (bit, remaining) in self.remaining.iter_mut().enumerate() {
            if buttons.bits() & (1 << bit) != 0 {
                *remaining = self.hold_ticks;
            }
        }
    }

    /// Buttons held this tick; counts each held button down by one
    fn sample(&mut self) -> Buttons {
        let mut held = Buttons::empty();
        for (bit, remaining) in self.remaining.iter_mut().enumerate() {
            if *remaining > 0 {
                *remaining -= 1;
                held |= Buttons::from_bits_truncate(1 << bit);
            }
        }
        held
    }
}

/// Real-time hardware on the host
pub struct HostHardware {
    irq: Arc<InterruptFlags>,
    running: Arc<AtomicBool>,
    vblank_thread: Option<JoinHandle<()>>,
    audio: AudioOutput,
    keys: KeyHold,
    quit: bool,
    enabled: bool,
    pending: Vec<i8>,
    tick_budget: Duration,
    tick_started: Instant,
    overruns: u64,
}

impl HostHardware {
    /// Start the vertical blank timer
    pub fn start(audio: AudioOutput, hold_ticks: u32) -> Result<Self> {
        let irq = Arc::new(InterruptFlags::new());
        let running = Arc::new(AtomicBool::new(true));
        let period = handheld_specs().tick_duration();

        let vblank_thread = std::thread::Builder::new()
            .name("cartvox-vblank".to_string())
            .spawn({
                let irq = Arc::clone(&irq);
                let running = Arc::clone(&running);
                move || {
                    let mut deadline = Instant::now() + period;
                    while running.load(Ordering::Relaxed) {
                        let now = Instant::now();
                        if deadline > now {
                            std::thread::sleep(deadline - now);
                        }
                        irq.raise(Interrupts::VBLANK);
                        deadline += period;
                    }
                }
            })?;

        Ok(Self {
            irq,
            running,
            vblank_thread: Some(vblank_thread),
            audio,
            keys: KeyHold::new(hold_ticks),
            quit: false,
            enabled: false,
            pending: Vec::new(),
            tick_budget: period,
            tick_started: Instant::now(),
            overruns: 0,
        })
    }

    /// The operator asked to quit
    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    fn drain_keys(&mut self) {
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => return,
                Err(e) => {
                    tracing::warn!("input poll failed: {}", e);
                    return;
                }
            }

            let key = match event::read() {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("input read failed: {}", e);
                    return;
                }
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }

            match map_key(&key) {
                Some(KeyAction::Press(buttons)) => self.keys.press(buttons),
                Some(KeyAction::Quit) => self.quit = true,
                None => {}
            }
        }
    }
}

impl HardwareIo for HostHardware {
    fn poll_input(&mut self) -> Buttons {
        self.drain_keys();
        self.keys.sample()
    }

    fn await_next_tick(&mut self) {
        let work = self.tick_started.elapsed();
        if work > self.tick_budget {
            self.overruns += 1;
            tracing::warn!(
                "tick {:.2} ms over budget ({} overruns)",
                (work - self.tick_budget).as_secs_f64() * 1000.0,
                self.overruns
            );
        }

        self.irq.wait_vblank();
        self.tick_started = Instant::now();
    }

    fn disable_transfer(&mut self) {
        self.enabled = false;
    }

    fn configure_transfer(&mut self, config: &TransferConfig<'_>) {
        if self.enabled {
            tracing::warn!("transfer reconfigured while running");
        }
        self.pending.clear();
        self.pending.extend_from_slice(config.source);
    }

    fn enable_transfer(&mut self) {
        self.enabled = true;
        self.audio.push_fifo(&self.pending);
    }
}

impl Drop for HostHardware {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.vblank_thread.take()
            && thread.join().is_err()
        {
            tracing::error!("vblank thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(map_key(&key(KeyCode::Right)), Some(KeyAction::Press(Buttons::RIGHT)));
        assert_eq!(map_key(&key(KeyCode::Enter)), Some(KeyAction::Press(Buttons::START)));
        assert_eq!(map_key(&key(KeyCode::Tab)), Some(KeyAction::Press(Buttons::SELECT)));
        assert_eq!(map_key(&key(KeyCode::Char('a'))), Some(KeyAction::Press(Buttons::L)));
        assert_eq!(map_key(&key(KeyCode::Char('s'))), Some(KeyAction::Press(Buttons::R)));
        assert_eq!(map_key(&key(KeyCode::Esc)), Some(KeyAction::Quit));
        assert_eq!(map_key(&key(KeyCode::Char('m'))), None);
        assert_eq!(
            map_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyAction::Quit)
        );
    }

    #[test]
    fn test_key_hold_counts_down() {
        let mut keys = KeyHold::new(3);
        keys.press(Buttons::RIGHT);

        assert_eq!(keys.sample(), Buttons::RIGHT);
        assert_eq!(keys.sample(), Buttons::RIGHT);
        assert_eq!(keys.sample(), Buttons::RIGHT);
        assert_eq!(keys.sample(), Buttons::empty());
    }

    #[test]
    fn test_key_repeat_extends_hold() {
        let mut keys = KeyHold::new(2);
        keys.press(Buttons::R);
        keys.sample();
        keys.press(Buttons::R);

        assert_eq!(keys.sample(), Buttons::R);
        assert_eq!(keys.sample(), Buttons::R);
        assert_eq!(keys.sample(), Buttons::empty());
    }

    #[test]
    fn test_key_hold_is_per_button() {
        let mut keys = KeyHold::new(2);
        keys.press(Buttons::SELECT);
        keys.sample();
        keys.press(Buttons::START);

        assert_eq!(keys.sample(), Buttons::SELECT | Buttons::START);
        assert_eq!(keys.sample(), Buttons::START);
    }

    #[test]
    fn test_zero_hold_still_registers_press() {
        let mut keys = KeyHold::new(0);
        keys.press(Buttons::A);
        assert_eq!(keys.sample(), Buttons::A);
        assert_eq!(keys.sample(), Buttons::empty());
    }
}
