use super::*;

use crate::foundation::core::TimeKey;

fn entries(names: &[&str]) -> Vec<FrameEntry> {
    names
        .iter()
        .enumerate()
        .map(|(i, n)| FrameEntry {
            path: PathBuf::from(n),
            file_name: n.to_string(),
            time: TimeKey::from(i as u64),
        })
        .collect()
}

fn written(e: &FrameEntry) -> TrackovlResult<BatchReport> {
    Ok(BatchReport {
        written: vec![PathBuf::from(format!("out_{}", e.file_name))],
        skipped: Vec::new(),
    })
}

#[test]
fn recoverable_errors_skip_the_frame() {
    let frames = entries(&["a_T1.png", "b_T2.png", "c_T3.png"]);
    let report = run_frames(&frames, &BatchOpts::default(), |e| {
        if e.file_name.starts_with('b') {
            Err(TrackovlError::lookup("time 2 not in track table"))
        } else {
            written(e)
        }
    })
    .unwrap();
    assert_eq!(
        report.written,
        vec![PathBuf::from("out_a_T1.png"), PathBuf::from("out_c_T3.png")]
    );
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].file, "b_T2.png");
    assert!(report.skipped[0].error.starts_with("lookup error:"));
    assert!(!report.is_clean());
}

#[test]
fn fatal_errors_end_the_batch() {
    let frames = entries(&["a_T1.png", "b_T2.png"]);
    let err = run_frames(&frames, &BatchOpts::default(), |_| {
        Err(TrackovlError::color_format("bad"))
    })
    .unwrap_err();
    assert!(matches!(err, TrackovlError::ColorFormat(_)));
}

#[test]
fn parallel_results_keep_file_order() {
    let names: Vec<String> = (0..32).map(|i| format!("f_T{i:04}.png")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let frames = entries(&refs);
    let opts = BatchOpts {
        parallel: true,
        threads: Some(4),
    };
    let report = run_frames(&frames, &opts, written).unwrap();
    let expected: Vec<PathBuf> = names
        .iter()
        .map(|n| PathBuf::from(format!("out_{n}")))
        .collect();
    assert_eq!(report.written, expected);
    assert!(report.is_clean());
}

#[test]
fn zero_threads_is_rejected() {
    let opts = BatchOpts {
        parallel: true,
        threads: Some(0),
    };
    let err = run_frames(&entries(&["a_T1.png"]), &opts, written).unwrap_err();
    assert!(matches!(err, TrackovlError::Validation(_)));
}

#[test]
fn report_serializes_to_json() {
    let mut report = BatchReport::default();
    report.written.push(PathBuf::from("out/ovl_a_T1.png"));
    report.skip(
        "a_T1.png",
        Some(&TrackId::from("C")),
        &TrackovlError::lookup("track C not found at time 1"),
    );
    report.skip("b_T2.png", None, &TrackovlError::lookup("time 2 not in track table"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("report.json");
    report.write_json(&path).unwrap();
    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(v["written"][0], "out/ovl_a_T1.png");
    assert_eq!(v["skipped"][0]["track"], "C");
    assert!(v["skipped"][1].get("track").is_none());
}
