use std::thread::sleep;
use std::time::Duration;

use super::time::*;

#[test]
fn test_nano_realtime_moves_forward() {
    let t1 = nano_realtime();
    sleep(Duration::from_millis(2));
    let t2 = nano_realtime();

    assert!(t2 > t1);
    assert!(t2 - t1 >= 2_000_000);
}

#[test]
fn test_system_clock_is_monotonic() {
    let clock = SystemClock;
    let mut last = clock.now_nanos();
    for _ in 0..1000 {
        let now = clock.now_nanos();
        assert!(now >= last);
        last = now;
    }
}
