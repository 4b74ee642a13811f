use super::*;

#[test]
fn first_update_always_reports() {
    let mut p = Progress::new("t", 100);
    let r = p.update_at(0, Duration::ZERO).unwrap();
    assert_eq!(r.percent, 0.0);
    assert_eq!(r.remaining, None);
}

#[test]
fn reports_are_spaced_by_the_step() {
    let mut p = Progress::new("t", 100);
    let reported: Vec<usize> = (1..=100)
        .filter(|&done| p.update_at(done, Duration::from_secs(1)).is_some())
        .collect();
    assert_eq!(reported.first(), Some(&1));
    assert_eq!(reported[1], 6);
    for pair in reported.windows(2) {
        assert!(pair[1] - pair[0] > 4);
    }
    assert!(reported.len() < 25);
}

#[test]
fn remaining_time_is_linear() {
    let mut p = Progress::new("t", 10);
    let r = p.update_at(5, Duration::from_secs(20)).unwrap();
    assert_eq!(r.percent, 50.0);
    assert_eq!(r.remaining, Some(Duration::from_secs(20)));
}

#[test]
fn empty_track_never_reports() {
    let mut p = Progress::new("t", 0);
    assert!(p.update(0).is_none());
}
