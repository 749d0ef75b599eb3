mod tests {
    use embassy_time::{Duration, Instant};
    use shelflight::{
        CommandMailbox, LedStrip, MemoryTransport, ShelfConfig, ShelfModel, ShelfScheduler,
        StripConfig,
    };

    fn make_shelf(mailbox: &CommandMailbox<4>) -> ShelfModel<'_, MemoryTransport, 4> {
        let strip = LedStrip::new(
            &StripConfig {
                enabled: true,
                ..StripConfig::default()
            },
            MemoryTransport::new(),
        );
        ShelfModel::new(strip, mailbox, &ShelfConfig::default())
    }

    #[test]
    fn test_deadlines_advance_by_the_tick_interval() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox);
        let mut scheduler = ShelfScheduler::with_interval(Duration::from_millis(16));

        let result = scheduler.tick(&mut shelf, Instant::from_millis(0));
        assert_eq!(result.next_deadline, Instant::from_millis(16));
        assert_eq!(result.sleep_duration, Duration::from_millis(16));

        let result = scheduler.tick(&mut shelf, Instant::from_millis(16));
        assert_eq!(result.next_deadline, Instant::from_millis(32));
        assert_eq!(result.sleep_duration, Duration::from_millis(16));
    }

    #[test]
    fn test_running_late_shortens_the_sleep() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox);
        let mut scheduler = ShelfScheduler::with_interval(Duration::from_millis(16));

        scheduler.tick(&mut shelf, Instant::from_millis(0));
        // 10 ms late for the 16 ms deadline: only 6 ms left to sleep.
        let result = scheduler.tick(&mut shelf, Instant::from_millis(26));
        assert_eq!(result.next_deadline, Instant::from_millis(32));
        assert_eq!(result.sleep_duration, Duration::from_millis(6));
    }

    #[test]
    fn test_long_stall_resets_the_schedule() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox);
        let mut scheduler = ShelfScheduler::with_interval(Duration::from_millis(16));

        scheduler.tick(&mut shelf, Instant::from_millis(0));
        // A stall beyond two intervals skips the backlog instead of
        // catching up in a burst.
        let result = scheduler.tick(&mut shelf, Instant::from_millis(500));
        assert_eq!(result.next_deadline, Instant::from_millis(516));
        assert_eq!(result.sleep_duration, Duration::from_millis(16));
    }
}
