// tests/integration.rs
// Integration tests for the resampling pipeline

use std::fs;
use std::path::Path;

use calib_resample::{
    default_output_path, interpolate_file, read_column, CalibError, Dataset, FieldExtractor,
    LinearModel, Resampler, Stats, Timestamps,
};
use tempfile::tempdir;

/// Helper to create a sparse log: one sample per minute of two drifting
/// link variables.
fn create_sparse_log(path: &Path, start: i64, samples: usize) -> std::io::Result<()> {
    let mut text = String::from("#\n# Columns:\n# timestamp rtt temp\n");
    for i in 0..samples {
        let t = start + 60 * i as i64;
        let rtt = 845000.0 + 3.5 * i as f64;
        let temp = 45.0 + 0.25 * (i % 4) as f64;
        text.push_str(&format!("{} {} {}\n", t, rtt, temp));
    }
    fs::write(path, text)
}

#[test]
fn test_concrete_scenario_end_to_end() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("scenario.dat");
    let output = dir.path().join("scenario_output.dat");
    fs::write(&input, "# comment\n0 1.0 10.0\n2 3.0 14.0\n4 5.0 18.0\n").unwrap();

    let rows = interpolate_file(&input, &output).expect("Failed to resample");
    assert_eq!(rows, 4);

    let content = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 7); // 3 header lines + 4 rows
    assert!(lines[..3].iter().all(|l| l.starts_with('#')));
    assert!(lines[1].contains("scenario.dat"));
    assert_eq!(&lines[3..], &["0 1.00 10.00", "1 2.00 12.00", "2 3.00 14.00", "3 4.00 16.00"]);
}

#[test]
fn test_minute_log_expands_to_seconds() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("link.dat");
    create_sparse_log(&input, 1505118019, 11).unwrap();

    let output = default_output_path(&input);
    let rows = interpolate_file(&input, &output).expect("Failed to resample");
    assert_eq!(rows, 600);
    assert_eq!(output.file_name().unwrap(), "link_output.dat");

    // The output is itself a valid log with consecutive times.
    let grid = Dataset::load(&output).unwrap();
    assert_eq!(grid.len(), 600);
    for (offset, &t) in grid.times.iter().enumerate() {
        assert_eq!(t, 1505118019 + offset as i64);
    }

    // Values at original sample times are reproduced.
    let source = Dataset::load(&input).unwrap();
    for (i, &t) in source.times.iter().enumerate().take(10) {
        let row = (t - 1505118019) as usize;
        assert!((grid.columns[0][row] - source.columns[0][i]).abs() < 0.005);
        assert!((grid.columns[1][row] - source.columns[1][i]).abs() < 0.005);
    }
}

#[test]
fn test_malformed_row_writes_nothing() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("bad.dat");
    let output = dir.path().join("bad_output.dat");
    fs::write(&input, "# c\n0 1.0 2.0\n1 1.5\n2 2.0 3.0\n").unwrap();

    let result = interpolate_file(&input, &output);
    assert!(matches!(result, Err(CalibError::MalformedInput { line: 3, .. })));
    assert!(!output.exists());
}

#[test]
fn test_failed_retry_keeps_previous_output_whole() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("log.dat");
    let output = dir.path().join("log_output.dat");

    fs::write(&input, "0 1.0\n10 2.0\n").unwrap();
    interpolate_file(&input, &output).unwrap();
    let first = fs::read_to_string(&output).unwrap();

    fs::write(&input, "0 1.0\n10 2.0 \n").unwrap();
    assert!(interpolate_file(&input, &output).is_err());
    assert_eq!(fs::read_to_string(&output).unwrap(), first);
}

#[test]
fn test_single_sample_log_is_insufficient() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("one.dat");
    let output = dir.path().join("one_output.dat");
    fs::write(&input, "# only one\n100 4.0 5.0\n").unwrap();

    let result = interpolate_file(&input, &output);
    assert!(matches!(result, Err(CalibError::InsufficientData { needed: 2, got: 1 })));
    assert!(!output.exists());
}

#[test]
fn test_decreasing_timestamps_are_rejected() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("swap.dat");
    let output = dir.path().join("swap_output.dat");
    fs::write(&input, "# c\n0 1.0\n20 2.0\n10 3.0\n").unwrap();

    let result = interpolate_file(&input, &output);
    assert!(matches!(result, Err(CalibError::MalformedInput { line: 4, .. })));
    assert!(!output.exists());
}

#[test]
fn test_missing_input_file() {
    let dir = tempdir().unwrap();
    let result = interpolate_file(dir.path().join("absent.dat"), dir.path().join("out.dat"));
    assert!(matches!(result, Err(CalibError::Io(_))));
}

#[test]
fn test_linearity_between_samples() {
    let times = [0, 7, 19, 40];
    let values = [3.0, -4.0, 8.0, 8.5];
    let model = LinearModel::build(&times, &values).unwrap();
    let grid = Resampler::new(vec![model]).unwrap().collect().unwrap();

    for pair in 0..times.len() - 1 {
        let (t0, t1) = (times[pair], times[pair + 1]);
        let (v0, v1) = (values[pair], values[pair + 1]);
        for t in t0 + 1..t1 {
            let expected = v0 + (v1 - v0) * (t - t0) as f64 / (t1 - t0) as f64;
            let actual = grid.rows[t as usize].values[0];
            assert!((actual - expected).abs() < 1e-9, "t={} {} != {}", t, actual, expected);
        }
    }
}

#[test]
fn test_extract_resample_and_stats_pipeline() {
    let dir = tempdir().unwrap();
    let capture = dir.path().join("minicom.log");
    let mut text = String::new();
    for i in 0..5 {
        text.push_str(&format!("wr0 -> lnk:1 rx:1 tx:1 lock:1 crtt:{}\n", 812000 + 10 * i));
        text.push_str(&format!("temp: 4{}.50 C\n", i));
    }
    fs::write(&capture, text).unwrap();

    let extracted = default_output_path(&capture);
    let extractor = FieldExtractor::new(&["crtt", "temp"]).unwrap();
    let ts = Timestamps { seed: 1000, incr: 30 };
    assert_eq!(extractor.extract_file(&capture, &extracted, Some(ts)).unwrap(), 5);

    let resampled = dir.path().join("resampled.log");
    assert_eq!(interpolate_file(&extracted, &resampled).unwrap(), 120);

    let crtt = read_column(&resampled, 1).unwrap();
    assert_eq!(crtt.len(), 120);
    let stats = Stats::compute(&crtt).unwrap();
    assert_eq!(stats.min, 812000.0);
    assert!((stats.max - 812039.67).abs() < 1e-9);
    assert!((stats.peak_to_peak - 39.67).abs() < 1e-9);
}

#[cfg(unix)]
#[test]
fn test_outputs_get_plain_file_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;

    let capture = dir.path().join("capture.log");
    fs::write(&capture, "rx:1\nrx:2\n").unwrap();
    let extracted = dir.path().join("capture_output.log");
    let extractor = FieldExtractor::new(&["rx"]).unwrap();
    extractor
        .extract_file(&capture, &extracted, Some(Timestamps { seed: 0, incr: 5 }))
        .unwrap();

    let resampled = dir.path().join("resampled.log");
    interpolate_file(&extracted, &resampled).unwrap();

    // The capture was written with fs::write, i.e. the process umask.
    assert_eq!(mode(&extracted), mode(&capture));
    assert_eq!(mode(&resampled), mode(&capture));
}
