// reelsmith-core/tests/still_clip_tests.rs

#![cfg(unix)]

mod common;

use common::{MockFfmpegProcess, MockFfmpegSpawner, MockFfprobeExecutor, valid_media};
use reelsmith_core::config::{CoreConfig, CoreConfigBuilder};
use reelsmith_core::error::CoreError;
use reelsmith_core::overlay::{LogoOutro, StillImageClip, TextOverlay, TextPosition, Transition};
use std::time::Duration;
use tempfile::tempdir;

fn config() -> CoreConfig {
    CoreConfigBuilder::new()
        .ffmpeg_path("/bin/sh")
        .timeout(Some(Duration::from_secs(2)))
        .build()
}

#[test]
fn test_clip_with_logo_validates_final_artifact() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("card.mp4");
    let final_output = dir.path().join("card_final.mp4");

    let spawner = MockFfmpegSpawner::new();
    spawner.add_expectation(
        "-loop 1 -t 5 -i card.png",
        MockFfmpegProcess::exiting("frame=1 time=00:00:02.50\rframe=2 time=00:00:05.00\n", 0),
        true,
    );
    spawner.add_expectation("-t 3 -i logo.png", MockFfmpegProcess::exiting("", 0), true);
    spawner.add_expectation(
        "xfade=transition=hblur:duration=0.5:offset=4.5",
        MockFfmpegProcess::exiting("", 0),
        true,
    );
    let prober = MockFfprobeExecutor::new();
    prober.expect_probe(&final_output, valid_media(&final_output.to_string_lossy(), 7.5));

    let clip = StillImageClip::new("card.png", &output)
        .text(TextOverlay::new("Hello").position(TextPosition::TopLeft))
        .logo(LogoOutro::new("logo.png", Transition::parse("hblur")));

    let mut reported = Vec::new();
    let media = clip
        .run(&config(), &spawner, &prober, |p| reported.push(p))?
        .expect("validated descriptor");

    assert_eq!(media.duration, Some(7.5));
    assert_eq!(reported, vec![0.0, 0.5, 1.0, 1.0]);

    let calls = spawner.get_received_calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].iter().any(|a| a.starts_with("[in]drawtext=") && a.contains("x=40:y=75")));
    let logo_clip = dir.path().join("card_logo.mp4").to_string_lossy().into_owned();
    assert_eq!(calls[1].last(), Some(&logo_clip));
    let combined = final_output.to_string_lossy().into_owned();
    assert_eq!(calls[2].last(), Some(&combined));
    assert_eq!(prober.calls(), vec![final_output.to_string_lossy().into_owned()]);
    Ok(())
}

#[test]
fn test_failed_combine_is_recorded() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("card.mp4");

    let spawner = MockFfmpegSpawner::new();
    spawner.add_expectation("-i card.png", MockFfmpegProcess::exiting("", 0), true);
    spawner.add_expectation("-i logo.png", MockFfmpegProcess::exiting("", 0), true);
    spawner.add_expectation(
        "xfade=",
        MockFfmpegProcess::exiting("Invalid transition\n", 1),
        false,
    );
    let prober = MockFfprobeExecutor::new();

    let clip = StillImageClip::new("card.png", &output)
        .logo(LogoOutro::new("logo.png", Transition::Random));
    let err = clip.run(&config(), &spawner, &prober, |_| {}).unwrap_err();

    match err {
        CoreError::EncodingFailed { errors, output } => {
            assert_eq!(
                errors,
                vec![
                    "ffmpeg returned non-zero exit code while combining the logo".to_string(),
                    "no output file created".to_string(),
                    "encoded file is invalid".to_string(),
                ]
            );
            assert!(output.contains("Invalid transition"));
        }
        other => panic!("expected EncodingFailed, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_clip_without_logo_skips_combination() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("card.mp4");

    let spawner = MockFfmpegSpawner::new();
    spawner.add_expectation("-t 2 -i card.png", MockFfmpegProcess::exiting("", 0), true);
    let prober = MockFfprobeExecutor::new();
    prober.expect_probe(&output, valid_media(&output.to_string_lossy(), 2.0));

    let media = StillImageClip::new("card.png", &output)
        .duration(2.0)
        .run(&config(), &spawner, &prober, |_| {})?;

    assert!(media.is_some());
    assert_eq!(spawner.get_received_calls().len(), 1);
    Ok(())
}
