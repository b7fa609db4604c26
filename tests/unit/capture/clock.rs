use super::*;

#[test]
fn paced_clock_interval_matches_fps() {
    let clock = PacedClock::new(Fps::new(30, 1).unwrap());
    let nanos = clock.interval().as_nanos();
    assert!((33_333_000..=33_334_000).contains(&nanos));
}

#[test]
fn paced_clock_spaces_ticks() {
    let mut clock = PacedClock::new(Fps::new(100, 1).unwrap());
    let start = Instant::now();
    for _ in 0..4 {
        clock.wait_next();
    }
    // First tick is immediate, the next three wait one interval each.
    assert!(start.elapsed() >= Duration::from_millis(30));
}

#[test]
fn immediate_clock_never_blocks() {
    let mut clock = ImmediateClock;
    let start = Instant::now();
    for _ in 0..1000 {
        clock.wait_next();
    }
    assert!(start.elapsed() < Duration::from_secs(1));
}
