use super::*;

fn ids(v: &[&str]) -> Vec<TrackId> {
    v.iter().map(|s| TrackId::from(*s)).collect()
}

#[test]
fn fixed_position_wins_over_track_ids() {
    let mode = CropMode::select(ids(&["1", "2"]), Some((30, 40))).unwrap();
    assert_eq!(mode, CropMode::Fixed { x: 30, y: 40 });
}

#[test]
fn track_ids_alone_select_track_mode() {
    let mode = CropMode::select(ids(&["1"]), None).unwrap();
    assert_eq!(mode, CropMode::Tracks(ids(&["1"])));
}

#[test]
fn neither_mode_is_validation_error() {
    let err = CropMode::select(Vec::new(), None).unwrap_err();
    assert!(matches!(err, TrackovlError::Validation(_)));
}

#[test]
fn output_names_encode_track_or_position() {
    assert_eq!(
        track_crop_name(&TrackId::from("17"), "img_T0003.png"),
        "17_img_T0003.png"
    );
    assert_eq!(fixed_crop_name(120, 45, "img_T0003.png"), "x120_y45_img_T0003.png");
}

#[test]
fn track_mode_without_table_is_rejected() {
    let opts = CropOptions {
        work_dir: PathBuf::from("/nonexistent"),
        tracks_dir: PathBuf::from("t"),
        images_dir: PathBuf::from("i"),
        out_dir: PathBuf::from("o"),
        columns: TrackColumns::default(),
        radii: CropRadii::default(),
        track_ids: ids(&["1"]),
        fixed: None,
    };
    assert!(opts.wants_table());
    let dir = tempfile::tempdir().unwrap();
    let opts = CropOptions {
        work_dir: dir.path().to_path_buf(),
        ..opts
    };
    std::fs::create_dir(dir.path().join("i")).unwrap();
    let err = crop_directory(&opts, None, &FrameResolver::default(), &BatchOpts::default())
        .unwrap_err();
    assert!(matches!(err, TrackovlError::Validation(_)));
    assert!(!dir.path().join("o").exists());
}
