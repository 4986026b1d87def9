//! End-to-end tests for the driver commands

use bellfir_cli::commands;
use bellfir_cli::config::DriverConfig;
use bellfir_dsp::harness::AnalysisBundle;

fn short_config(dir: &std::path::Path) -> DriverConfig {
    let mut config = DriverConfig::default();
    config.signal.duration_secs = 0.5;
    config.signal.seed = 3;
    config.output.directory = dir.join("render");
    config
}

#[test]
fn design_report_for_reference_filter() {
    let report = commands::design(&DriverConfig::default(), false).unwrap();
    assert_eq!(report.order, 2048);
    assert_eq!(report.group_delay_samples, 1024);
    assert_eq!(report.window, "blackman");
    assert!(report.coefficients.is_none());

    // 10^(12/20) + 1
    assert!((report.target_magnitude - 4.981_071_705_534_973).abs() < 1e-9);
    assert!(report.realized_magnitude > 3.0);
    assert!(report.realized_gain_db > 9.5);
    assert!(report.imaginary_residual < 1e-9);
}

#[test]
fn design_report_can_carry_coefficients() {
    let mut config = DriverConfig::default();
    config.design.order = 128;
    let report = commands::design(&config, true).unwrap();
    assert_eq!(report.coefficients.map(|c| c.len()), Some(128));
}

#[test]
fn render_writes_audio_and_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let config = short_config(dir.path());

    let report = commands::render(&config).unwrap();
    assert_eq!(report.frames, 22_050);
    assert!(report.filtered_peak <= 1.0);
    assert!(report.psd_boost_db.unwrap() > 3.0);

    for path in [&report.original_wav, &report.filtered_wav] {
        let reader = hound::WavReader::open(path).unwrap();
        assert_eq!(reader.spec().sample_rate, 44_100);
        assert_eq!(reader.spec().bits_per_sample, 16);
        assert_eq!(reader.len(), 22_050);
    }

    let text = std::fs::read_to_string(&report.analysis_json).unwrap();
    let bundle: AnalysisBundle = serde_json::from_str(&text).unwrap();
    assert_eq!(bundle.sample_rate, 44_100);
    assert_eq!(bundle.frequencies.len(), 22_050 / 2 + 1);
    assert_eq!(bundle.psd_frequencies.len(), 513);
}

#[test]
fn render_is_reproducible_for_a_seed() {
    let dir = tempfile::tempdir().unwrap();
    let config = short_config(dir.path());

    let first = commands::render(&config).unwrap();
    let original_a = std::fs::read(&first.original_wav).unwrap();
    let filtered_a = std::fs::read(&first.filtered_wav).unwrap();

    let second = commands::render(&config).unwrap();
    assert_eq!(std::fs::read(&second.original_wav).unwrap(), original_a);
    assert_eq!(std::fs::read(&second.filtered_wav).unwrap(), filtered_a);
}
