use super::*;

#[test]
fn test_metrics_on_fresh_session() {
    let session = base_session();
    let m = compute_metrics(&session);

    assert_eq!(m.session, 0);
    assert_eq!(m.date, date(1979, 10, 1));
    assert_eq!(m.sectors, 16);
    assert_eq!(m.penalty_sectors, 2);
    assert_eq!(m.finished_sectors, 0);
    assert_eq!(m.activity_points_used, 0);
    assert_eq!(m.pending_tasks, 0);
    assert_eq!(m.journal_entries, 0);
    assert!(m.mean_canopy_cover.abs() < f64::EPSILON);
    // 14 cells at 160mm and 2 at 130mm.
    assert!((m.mean_soil_water - (14.0 * 160.0 + 2.0 * 130.0) / 16.0).abs() < 1e-9);
}

#[test]
fn test_metrics_track_queue_and_journal() {
    let mut session = base_session();
    session.add_task(irrigate("A1", 10.0)).unwrap();
    session.add_task(investigate("B2")).unwrap();

    let before = compute_metrics(&session);
    assert_eq!(before.activity_points_used, 3);
    assert_eq!(before.pending_tasks, 2);

    session.step();
    let after = compute_metrics(&session);
    assert_eq!(after.session, 1);
    assert_eq!(after.activity_points_used, 0);
    assert_eq!(after.pending_tasks, 0);
    assert_eq!(after.journal_entries, 1);
    // Recording engines gain 0.01 canopy per day.
    assert!((after.mean_canopy_cover - 0.30).abs() < 1e-9);
    assert!((after.max_canopy_cover - 0.30).abs() < 1e-9);
    assert!((after.penalty_mean_canopy_cover - 0.30).abs() < 1e-9);
}

#[test]
fn test_penalty_mean_is_zero_without_penalty_cells() {
    let (grid, _) = recording_grid(2, 2, 0, &base_setup());
    let mut session = FarmSession::new(grid, Constants::default());
    session.step();
    let m = compute_metrics(&session);
    assert_eq!(m.penalty_sectors, 0);
    assert!(m.penalty_mean_canopy_cover.abs() < f64::EPSILON);
}

#[test]
fn test_csv_row_matches_header_width() {
    let mut session = base_session();
    session.step();
    let mut buf = Vec::new();
    crate::metrics::write_metrics_header(&mut buf).unwrap();
    crate::metrics::append_metrics_row(&mut buf, &compute_metrics(&session)).unwrap();

    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0].split(',').count(),
        lines[1].split(',').count(),
        "header and row disagree:\n{text}"
    );
    assert!(lines[0].starts_with("session,metrics_version,date"));
    assert!(lines[1].starts_with("1,1,1979-10-31,0,"));
}

#[test]
fn test_metrics_file_writer_streams_rows() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = base_session();
    let mut writer = MetricsFileWriter::new(dir.path()).unwrap();
    for _ in 0..3 {
        session.step();
        writer.write_row(&compute_metrics(&session)).unwrap();
    }
    writer.flush().unwrap();

    let text = std::fs::read_to_string(dir.path().join("metrics.csv")).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert!(text.lines().nth(3).unwrap().starts_with("3,"));
}
