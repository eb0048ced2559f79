//! End-to-end playback on simulated hardware

mod common;

use cartvox_codec::{SpeechDecoder, SpeechEncoder};
use cartvox_core::resample::{midpoint, quantize};
use cartvox_core::specs::{FRAME_BYTES, FRAME_SAMPLES, OUTPUT_SAMPLES_PER_TICK};
use cartvox_core::{
    BufferRole, Buttons, EngineConfig, HardwareIo, NullStatus, Player, SimulatedHardware,
};

use common::{FakeDecoder, fake_frame, fake_sample, fake_track, pack_of};

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_next_and_previous_wrap_for_every_index() {
    for count in 1..=4u8 {
        let tracks = (0..count)
            .map(|t| (format!("t{}", t), fake_track(t, 100, 0)))
            .collect::<Vec<_>>();
        let pack = pack_of(tracks.iter().map(|(n, d)| (n.as_str(), d.clone())).collect());
        let mut player = Player::new(&pack, FakeDecoder::default(), EngineConfig::default()).unwrap();
        let mut hw = SimulatedHardware::new();

        for step in 0..count as u64 {
            let before = player.current_track();
            hw.press(step * 2, Buttons::RIGHT);
            hw.press(step * 2 + 1, Buttons::empty());
            player.run_for(&mut hw, &mut NullStatus, 2);
            assert_eq!(player.current_track(), (before + 1) % count as usize);
        }
        assert_eq!(player.current_track(), 0);

        let start = hw.tick();
        hw.press(start, Buttons::LEFT);
        player.tick(&mut hw, &mut NullStatus);
        assert_eq!(player.current_track(), count as usize - 1);
    }
}

#[test]
fn test_seek_forward_past_end_loads_next_track() {
    let pack = pack_of(vec![("a", fake_track(1, 30, 100)), ("b", fake_track(2, 30, 200))]);
    let mut player = Player::new(&pack, FakeDecoder::default(), EngineConfig::default()).unwrap();
    let mut hw = SimulatedHardware::with_script(vec![(1, Buttons::R)]);

    player.tick(&mut hw, &mut NullStatus);
    assert_eq!(player.adapter().decoder().seen, vec![(1, 0), (1, 1)]);
    assert_eq!(player.adapter().decoder().resets, 1);

    player.tick(&mut hw, &mut NullStatus);

    let decoder = player.adapter().decoder();
    assert_eq!(player.current_track(), 1);
    assert_eq!(decoder.resets, 2);
    // Decoding restarts at the first frame of the new track
    assert_eq!(&decoder.seen[2..], &[(2, 0), (2, 1)]);
}

#[test]
fn test_seek_within_track_resets_decoder() {
    let pack = pack_of(vec![("long", fake_track(1, 200, 100))]);
    let mut player = Player::new(&pack, FakeDecoder::default(), EngineConfig::default()).unwrap();
    let mut hw = SimulatedHardware::with_script(vec![(1, Buttons::R), (2, Buttons::empty())]);

    player.run_for(&mut hw, &mut NullStatus, 2);

    let decoder = player.adapter().decoder();
    assert_eq!(player.current_track(), 0);
    assert_eq!(decoder.resets, 2);
    assert_eq!(decoder.seen[2], (1, 52));
}

#[test]
fn test_track_step_with_l_held_starts_near_end() {
    let pack = pack_of(vec![("a", fake_track(1, 100, 100)), ("b", fake_track(2, 100, 200))]);
    let mut player = Player::new(&pack, FakeDecoder::default(), EngineConfig::default()).unwrap();
    let mut hw = SimulatedHardware::with_script(vec![
        (1, Buttons::L | Buttons::RIGHT),
        (2, Buttons::empty()),
        (3, Buttons::L | Buttons::LEFT),
    ]);

    player.run_for(&mut hw, &mut NullStatus, 2);
    assert_eq!(player.current_track(), 1);
    // 100 frames minus the 60-frame tail
    assert_eq!(&player.adapter().decoder().seen[2..4], &[(2, 40), (2, 41)]);

    player.tick(&mut hw, &mut NullStatus);
    let before = player.adapter().decoder().seen.len();
    player.tick(&mut hw, &mut NullStatus);
    assert_eq!(player.current_track(), 0);
    assert_eq!(&player.adapter().decoder().seen[before..], &[(1, 40), (1, 41)]);
}

#[test]
fn test_track_step_tail_clamps_on_short_track() {
    let pack = pack_of(vec![("a", fake_track(1, 100, 100)), ("b", fake_track(2, 30, 200))]);
    let mut player = Player::new(&pack, FakeDecoder::default(), EngineConfig::default()).unwrap();
    let mut hw = SimulatedHardware::with_script(vec![(1, Buttons::L | Buttons::RIGHT)]);

    player.run_for(&mut hw, &mut NullStatus, 2);

    assert_eq!(player.current_track(), 1);
    assert_eq!(&player.adapter().decoder().seen[2..], &[(2, 0), (2, 1)]);
}

// ============================================================================
// Stream bounds
// ============================================================================

#[test]
fn test_sequential_decode_stays_inside_track() {
    for frames in [1u16, 2, 7, 19] {
        let mut data = fake_track(9, frames, 0);
        // Trailing garbage shorter than a frame is never decoded
        data.extend_from_slice(&[0xD0; 10]);
        let len = data.len();
        let pack = pack_of(vec![("only", data)]);
        let mut player = Player::new(&pack, FakeDecoder::default(), EngineConfig::default()).unwrap();
        let mut hw = SimulatedHardware::new();

        let ticks = (frames as usize * FRAME_SAMPLES).div_ceil(304) as u64 + 1;
        for _ in 0..ticks {
            player.tick(&mut hw, &mut NullStatus);
            assert!(player.stream().position() <= len);
        }

        // The whole track, in order, before it wraps to itself
        let seen = &player.adapter().decoder().seen;
        let first_pass: Vec<u16> = seen.iter().take(frames as usize).map(|&(_, i)| i).collect();
        assert_eq!(first_pass, (0..frames).collect::<Vec<_>>());
        assert!(seen.iter().all(|&(_, i)| i < frames));
    }
}

// ============================================================================
// Output
// ============================================================================

#[test]
fn test_every_tick_emits_exactly_one_buffer() {
    let pack = pack_of(vec![
        ("a", fake_track(1, 3, 1000)),
        ("b", fake_track(2, 1, -1000)),
        ("c", vec![]),
        ("d", fake_track(4, 90, 50)),
    ]);
    let mut player = Player::new(&pack, FakeDecoder::default(), EngineConfig::default()).unwrap();
    let mut hw = SimulatedHardware::with_script(vec![
        (5, Buttons::RIGHT),
        (6, Buttons::R),
        (9, Buttons::L),
        (12, Buttons::START),
        (14, Buttons::empty()),
        (15, Buttons::START),
        (16, Buttons::LEFT),
        (17, Buttons::empty()),
    ]);

    player.run_for(&mut hw, &mut NullStatus, 40);

    assert_eq!(hw.commits().len(), 40);
    for commit in hw.commits() {
        assert_eq!(commit.samples.len(), OUTPUT_SAMPLES_PER_TICK);
    }
}

#[test]
fn test_handshake_never_targets_filling_buffer() {
    let pack = pack_of(vec![("a", fake_track(1, 40, 300))]);
    let mut player = Player::new(&pack, FakeDecoder::default(), EngineConfig::default()).unwrap();
    let mut hw = SimulatedHardware::new();

    for _ in 0..25 {
        player.tick(&mut hw, &mut NullStatus);

        let streaming = hw.streaming_buffer().unwrap();
        let sink = player.sink();
        assert_ne!(streaming, sink.filling_index());
        assert_eq!(sink.role(streaming), BufferRole::Streaming);
        // The hardware streams exactly what was written
        assert_eq!(
            hw.commits().last().unwrap().samples.as_slice(),
            &sink.buffer(streaming)[..]
        );
    }
    assert_eq!(hw.unsafe_reconfigurations(), 0);
}

#[test]
fn test_failed_first_frame_holds_then_interpolates_second() {
    const LEAD: i16 = 0x1200;
    const BASE: i16 = 0x1000;
    const STEP: i16 = 8;

    let mut scenario = fake_frame(2, 0, 0, 0, false);
    scenario.extend(fake_frame(2, 1, BASE, STEP, true));
    let pack = pack_of(vec![("lead", fake_track(1, 1, LEAD)), ("scenario", scenario)]);
    let mut player = Player::new(&pack, FakeDecoder::default(), EngineConfig::default()).unwrap();
    let mut hw = SimulatedHardware::new();

    // Tick 0 plays the lead-in and leaves LEAD as the held sample
    player.tick(&mut hw, &mut NullStatus);
    // Tick 1 advances to the two-frame track
    player.tick(&mut hw, &mut NullStatus);

    assert_eq!(player.current_track(), 1);
    assert_eq!(player.adapter().decode_failures(), 1);
    assert_eq!(
        player.adapter().decoder().seen,
        vec![(1, 0), (2, 0), (2, 1)]
    );

    let out = &hw.commits()[1].samples;
    assert_eq!(out.len(), OUTPUT_SAMPLES_PER_TICK);

    // Failed frame: held value for all 160 decoded samples
    let held = FRAME_SAMPLES * 2;
    assert!(out[..held].iter().all(|&s| s == quantize(LEAD)));

    // Second frame: interpolated from the held value onward
    let mut last = LEAD;
    for (k, pair) in out[held..].chunks(2).enumerate() {
        let cur = fake_sample(BASE, STEP, k);
        assert_eq!(pair, &[midpoint(last, cur), quantize(cur)], "sample {}", k);
        last = cur;
    }
}

#[test]
fn test_pause_freezes_and_resume_continues() {
    let pcm: Vec<i16> = (0..FRAME_SAMPLES * 300)
        .map(|i| ((i as f32 * 0.01).sin() * 8000.0) as i16)
        .collect();
    let data = SpeechEncoder::new().encode_stream(&pcm);
    let pack = pack_of(vec![("sine", data)]);

    const PAUSE_AT: u64 = 10;
    const RESUME_AT: u64 = 16;
    const TOTAL: u64 = 30;

    let mut reference =
        Player::new(&pack, SpeechDecoder::new(), EngineConfig::default()).unwrap();
    let mut ref_hw = SimulatedHardware::new();
    reference.run_for(&mut ref_hw, &mut NullStatus, TOTAL);

    let mut player = Player::new(&pack, SpeechDecoder::new(), EngineConfig::default()).unwrap();
    let mut hw = SimulatedHardware::with_script(vec![
        (PAUSE_AT, Buttons::START),
        (PAUSE_AT + 1, Buttons::empty()),
        (RESUME_AT, Buttons::START),
        (RESUME_AT + 1, Buttons::empty()),
    ]);
    player.run_for(&mut hw, &mut NullStatus, TOTAL);

    let before_pause = &hw.commits()[PAUSE_AT as usize - 1].samples;
    let last_emitted = *before_pause.last().unwrap();

    for tick in PAUSE_AT..RESUME_AT {
        let out = &hw.commits()[tick as usize].samples;
        assert!(out.iter().all(|&s| s == last_emitted), "tick {}", tick);
    }

    // After resuming, playback picks up exactly where it stopped
    let paused_for = (RESUME_AT - PAUSE_AT) as usize;
    for tick in RESUME_AT as usize..TOTAL as usize {
        assert_eq!(
            hw.commits()[tick].samples,
            ref_hw.commits()[tick - paused_for].samples,
            "tick {}",
            tick
        );
    }

    let resumed_first = hw.commits()[RESUME_AT as usize].samples[0];
    assert!((resumed_first as i16 - last_emitted as i16).abs() <= 1);
}

#[test]
fn test_pause_through_dyn_hardware() {
    let pack = pack_of(vec![("a", fake_track(1, 10, -2560))]);
    let mut player = Player::new(&pack, FakeDecoder::default(), EngineConfig::default()).unwrap();
    let mut sim = SimulatedHardware::with_script(vec![(1, Buttons::START)]);
    let hw: &mut dyn HardwareIo = &mut sim;

    player.run_for(hw, &mut NullStatus, 3);

    assert!(player.is_paused());
    assert!(sim.commits()[2].samples.iter().all(|&s| s == -10));
    assert_eq!(sim.output().len(), 3 * OUTPUT_SAMPLES_PER_TICK);
    assert!(player.stream().position() <= 10 * FRAME_BYTES);
}
