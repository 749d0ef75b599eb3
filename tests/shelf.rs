mod tests {
    use embassy_time::{Duration, Instant};
    use shelflight::{
        Animation, CommandMailbox, LedStrip, MemoryTransport, PixelBuffer, Rgb, ShelfCommand,
        ShelfConfig, ShelfEvent, ShelfLayout, ShelfModel, StripConfig,
    };

    const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
    const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };
    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    const GREEN: Rgb = Rgb { r: 10, g: 200, b: 30 };

    /// 2x2 compartments, 2 LEDs each, 1 wall LED between columns.
    /// Ranges: compartment 0 -> (5, 6), 1 -> (8, 9), 2 -> (3, 4),
    /// 3 -> (0, 1); walls at 2 and 7.
    fn small_layout() -> ShelfLayout {
        ShelfLayout {
            rows: 2,
            columns: 2,
            density: 2,
            wall_thickness: 1,
        }
    }

    fn make_shelf(
        mailbox: &CommandMailbox<8>,
        transitions: bool,
    ) -> ShelfModel<'_, MemoryTransport, 8> {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let strip = LedStrip::new(
            &StripConfig {
                count: 1,
                enabled: true,
                ..StripConfig::default()
            },
            MemoryTransport::new(),
        );
        let config = ShelfConfig {
            layout: small_layout(),
            brightness: 1.0,
            brightness_transitions: transitions,
            color_transitions: transitions,
            transition_duration_ms: 400,
        };
        ShelfModel::new(strip, mailbox, &config)
    }

    fn drain(shelf: &mut ShelfModel<'_, MemoryTransport, 8>) -> Vec<ShelfEvent> {
        let mut events = Vec::new();
        while let Some(event) = shelf.poll_event() {
            events.push(event);
        }
        events
    }

    struct SolidAnimation {
        color: Rgb,
        interval: Duration,
    }

    impl SolidAnimation {
        fn new(color: Rgb) -> Self {
            Self {
                color,
                interval: Duration::from_millis(40),
            }
        }
    }

    impl Animation for SolidAnimation {
        fn name(&self) -> &str {
            "solid"
        }

        fn frame_interval(&self) -> Duration {
            self.interval
        }

        fn set_frame_interval(&mut self, interval: Duration) {
            self.interval = interval;
        }

        fn paint(&mut self, _now: Instant, pixels: &mut PixelBuffer) {
            for led in 0..pixels.len() {
                let _ = pixels.set_color(led, self.color);
            }
        }
    }

    #[test]
    fn test_new_shelf_paints_white_and_stays_dark() {
        let mailbox = CommandMailbox::new();
        let shelf = make_shelf(&mailbox, false);

        assert!(!shelf.enabled());
        assert_eq!(shelf.strip().count(), 10);
        // Compartments hold the default white fill, walls stay black.
        assert_eq!(shelf.strip().color(5).unwrap(), WHITE);
        assert_eq!(shelf.strip().color(2).unwrap(), BLACK);
        // The disabled shelf is faded to zero.
        assert_eq!(shelf.strip().brightness(0).unwrap(), 0);
    }

    #[test]
    fn test_enable_and_disable_without_transitions() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox, false);
        let now = Instant::from_millis(0);

        shelf.set_enabled(true, now);
        assert!(shelf.enabled());
        assert_eq!(shelf.strip().brightness(0).unwrap(), 31);
        assert!(drain(&mut shelf).contains(&ShelfEvent::EnabledChanged(true)));

        shelf.set_enabled(false, now);
        assert_eq!(shelf.strip().brightness(0).unwrap(), 0);
        // The painted colors survive disabling; only brightness drops.
        assert_eq!(shelf.strip().color(5).unwrap(), WHITE);
    }

    #[test]
    fn test_black_fill_disables_and_enable_repaints_white() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox, false);
        let now = Instant::from_millis(0);

        shelf.set_enabled(true, now);
        shelf.set_average_color(BLACK, now);
        assert!(!shelf.enabled());

        shelf.set_enabled(true, now);
        assert!(shelf.enabled());
        assert_eq!(shelf.average_color(), WHITE);
        assert_eq!(shelf.strip().color(5).unwrap(), WHITE);
    }

    #[test]
    fn test_positive_brightness_implicitly_enables_and_fades() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox, true);
        let start = Instant::from_millis(0);

        shelf.set_brightness(0.8, start);
        assert!(shelf.enabled());
        assert!(shelf.brightness_transitioning());

        // 0.0 -> 0.8 scales the 400 ms base to 320 ms; halfway is 0.4.
        shelf.tick(Instant::from_millis(160));
        assert_eq!(shelf.strip().brightness(0).unwrap(), 12);

        shelf.tick(Instant::from_millis(320));
        assert!(!shelf.brightness_transitioning());
        assert_eq!(shelf.strip().brightness(0).unwrap(), 25);
        assert!(drain(&mut shelf).contains(&ShelfEvent::BrightnessChanged(0.8)));
    }

    #[test]
    fn test_enable_fade_reaches_full_brightness() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox, true);
        let start = Instant::from_millis(0);

        shelf.set_enabled(true, start);
        assert!(shelf.brightness_transitioning());

        shelf.tick(Instant::from_millis(200));
        assert_eq!(shelf.strip().brightness(0).unwrap(), 16);

        shelf.tick(Instant::from_millis(400));
        assert_eq!(shelf.strip().brightness(0).unwrap(), 31);
    }

    #[test]
    fn test_color_crossfade_commits_the_exact_target() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox, true);

        shelf.set_enabled(true, Instant::from_millis(0));
        shelf.tick(Instant::from_millis(500));

        let start = Instant::from_millis(1000);
        shelf.set_average_color(RED, start);
        assert!(shelf.color_transitioning());
        // While fading, the reported average is the fade target.
        assert_eq!(shelf.average_color(), RED);

        shelf.tick(Instant::from_millis(1100));
        let halfway = shelf.strip().color(5).unwrap();
        assert_ne!(halfway, WHITE);
        assert_ne!(halfway, RED);
        // Walls stay dark throughout the fade.
        assert_eq!(shelf.strip().color(2).unwrap(), BLACK);

        shelf.tick(Instant::from_millis(1500));
        assert!(!shelf.color_transitioning());
        assert_eq!(shelf.strip().color(5).unwrap(), RED);
        assert_eq!(shelf.average_color(), RED);
    }

    #[test]
    fn test_commands_drain_in_posting_order() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox, false);

        mailbox.post(ShelfCommand::SetAverageColor(RED)).unwrap();
        mailbox.post(ShelfCommand::SetBrightness(0.5)).unwrap();

        shelf.tick(Instant::from_millis(0));

        assert!(shelf.enabled());
        assert_eq!(shelf.brightness(), 0.5);
        assert_eq!(shelf.strip().brightness(0).unwrap(), 16);
        assert_eq!(shelf.strip().color(5).unwrap(), RED);

        let events = drain(&mut shelf);
        let color_position = events
            .iter()
            .position(|event| *event == ShelfEvent::AverageColorChanged(RED))
            .unwrap();
        let brightness_position = events
            .iter()
            .position(|event| *event == ShelfEvent::BrightnessChanged(0.5))
            .unwrap();
        assert!(color_position < brightness_position);
    }

    #[test]
    fn test_compartment_paint_implicitly_enables() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox, false);
        let now = Instant::from_millis(0);

        shelf.set_compartment_color(3, RED, now).unwrap();

        assert!(shelf.enabled());
        assert_eq!(shelf.strip().color(0).unwrap(), RED);
        assert_eq!(shelf.strip().color(1).unwrap(), RED);
        assert_eq!(shelf.compartment_color(3).unwrap(), RED);
        assert_eq!(shelf.compartment_color(0).unwrap(), WHITE);
    }

    #[test]
    fn test_painting_every_compartment_black_disables() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox, false);
        let now = Instant::from_millis(0);

        shelf.set_enabled(true, now);
        for compartment in 0..3 {
            shelf.set_compartment_color(compartment, BLACK, now).unwrap();
            assert!(shelf.enabled());
        }
        shelf.set_compartment_color(3, BLACK, now).unwrap();
        assert!(!shelf.enabled());
    }

    #[test]
    fn test_compartment_color_reads_black_while_disabled() {
        let mailbox = CommandMailbox::new();
        let shelf = make_shelf(&mailbox, false);

        assert_eq!(shelf.compartment_color(0).unwrap(), BLACK);
        assert!(shelf.compartment_color(4).is_err());
    }

    #[test]
    fn test_set_layout_resizes_the_strip() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox, false);

        shelf.set_layout(ShelfLayout::default()).unwrap();
        assert_eq!(shelf.strip().count(), 416);
        assert_eq!(shelf.compartment_count(), 20);
    }

    #[test]
    fn test_animation_saves_and_restores_colors() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox, false);
        let now = Instant::from_millis(0);

        shelf.set_enabled(true, now);
        shelf.bind_animation(Box::new(SolidAnimation::new(GREEN)), now);
        assert_eq!(shelf.animation_name(), Some("solid"));

        shelf.set_animating(true, now);
        assert!(shelf.animation_running());

        shelf.tick(now);
        assert_eq!(shelf.strip().color(5).unwrap(), GREEN);
        assert!(drain(&mut shelf).contains(&ShelfEvent::FrameComplete));

        shelf.set_animating(false, now);
        assert!(!shelf.animation_running());
        // Stopping restores the painted colors exactly; brightness is
        // governed by the fade engine and stays put.
        assert_eq!(shelf.strip().color(5).unwrap(), WHITE);
        assert_eq!(shelf.strip().brightness(0).unwrap(), 31);
    }

    #[test]
    fn test_animation_keeps_running_through_a_fade_out() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox, true);

        shelf.set_enabled(true, Instant::from_millis(0));
        shelf.tick(Instant::from_millis(500));

        let start = Instant::from_millis(1000);
        shelf.bind_animation(Box::new(SolidAnimation::new(GREEN)), start);
        shelf.set_animating(true, start);
        shelf.tick(start);
        assert_eq!(shelf.strip().color(5).unwrap(), GREEN);

        shelf.set_enabled(false, Instant::from_millis(2000));
        assert!(shelf.brightness_transitioning());

        // Mid-fade the driver still paints.
        shelf.tick(Instant::from_millis(2100));
        assert!(shelf.animation_running());

        // The completed fade-out stops the driver and restores colors.
        shelf.tick(Instant::from_millis(2500));
        assert!(!shelf.animation_running());
        assert_eq!(shelf.strip().color(5).unwrap(), WHITE);
        assert_eq!(shelf.strip().brightness(0).unwrap(), 0);
    }

    #[test]
    fn test_pending_brightness_transition_waits_for_the_first_frame() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox, true);
        let start = Instant::from_millis(0);

        shelf.bind_animation(Box::new(SolidAnimation::new(GREEN)), start);

        // Enabling shelf and animation together pre-darkens the strip
        // and parks the fade until the first frame has painted.
        shelf.set_animating(true, start);
        assert!(shelf.enabled());
        assert!(shelf.animation_running());
        assert!(!shelf.brightness_transitioning());
        assert_eq!(shelf.strip().brightness(0).unwrap(), 0);

        shelf.tick(start);
        assert_eq!(shelf.strip().color(5).unwrap(), GREEN);
        assert!(shelf.brightness_transitioning());

        shelf.tick(Instant::from_millis(400));
        assert_eq!(shelf.strip().brightness(0).unwrap(), 31);
    }

    #[test]
    fn test_clearing_the_binding_forces_animating_off() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox, false);
        let now = Instant::from_millis(0);

        shelf.bind_animation(Box::new(SolidAnimation::new(GREEN)), now);
        shelf.set_animating(true, now);
        assert!(shelf.animating());

        let driver = shelf.clear_animation(now);
        assert!(driver.is_some());
        assert!(!shelf.animating());
        assert!(!shelf.animation_running());
        assert_eq!(shelf.animation_name(), None);
    }

    #[test]
    fn test_setting_average_color_stops_a_running_animation() {
        let mailbox = CommandMailbox::new();
        let mut shelf = make_shelf(&mailbox, false);
        let now = Instant::from_millis(0);

        shelf.set_enabled(true, now);
        shelf.bind_animation(Box::new(SolidAnimation::new(GREEN)), now);
        shelf.set_animating(true, now);
        shelf.tick(now);

        shelf.set_average_color(RED, now);
        assert!(!shelf.animating());
        assert!(!shelf.animation_running());
        // The new fill wins; the pre-animation snapshot is not restored.
        assert_eq!(shelf.strip().color(5).unwrap(), RED);
    }
}
