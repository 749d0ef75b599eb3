mod tests {
    use embassy_time::{Duration, Instant};
    use shelflight::{Animation, FireAnimation, PixelBuffer};

    const BASE: (u8, u8, u8) = (255, 96, 12);

    #[test]
    fn test_fire_flicker_stays_below_the_base_color() {
        let mut fire = FireAnimation::new();
        let mut pixels = PixelBuffer::new(32);

        for frame in 0..20 {
            fire.paint(Instant::from_millis(frame * 50), &mut pixels);
            for led in 0..pixels.len() {
                let color = pixels.color(led).unwrap();
                assert!(color.r <= BASE.0);
                assert!(color.g <= BASE.1);
                assert!(color.b <= BASE.2);
                // The flicker subtracts at most 100 per channel.
                assert!(color.r >= BASE.0 - 100);
            }
        }
    }

    #[test]
    fn test_fire_varies_across_the_strip() {
        let mut fire = FireAnimation::new();
        let mut pixels = PixelBuffer::new(64);
        fire.paint(Instant::from_millis(0), &mut pixels);

        let first = pixels.color(0).unwrap();
        let uniform = (1..pixels.len()).all(|led| pixels.color(led).unwrap() == first);
        assert!(!uniform, "flicker should not paint a uniform strip");
    }

    #[test]
    fn test_fire_rerandomizes_the_frame_interval() {
        let mut fire = FireAnimation::new();
        let mut pixels = PixelBuffer::new(8);

        let mut intervals = Vec::new();
        for frame in 0..50 {
            fire.paint(Instant::from_millis(frame * 50), &mut pixels);
            let interval = fire.frame_interval();
            assert!(interval >= Duration::from_millis(40));
            assert!(interval <= Duration::from_millis(60));
            intervals.push(interval);
        }
        intervals.dedup();
        assert!(intervals.len() > 1, "interval should vary between frames");
    }

    #[test]
    fn test_frame_interval_is_settable() {
        let mut fire = FireAnimation::new();
        fire.set_frame_interval(Duration::from_millis(100));
        assert_eq!(fire.frame_interval(), Duration::from_millis(100));
        assert_eq!(fire.name(), "fire");
    }
}
