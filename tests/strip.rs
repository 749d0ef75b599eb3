mod tests {
    use shelflight::{LedStrip, MAX_BRIGHTNESS, MemoryTransport, Rgb, StripConfig, gamma_lut};

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };

    fn enabled_config(count: usize) -> StripConfig {
        StripConfig {
            count,
            enabled: true,
            ..StripConfig::default()
        }
    }

    #[test]
    fn test_show_emits_header_pixels_and_footer() {
        let mut strip = LedStrip::new(&enabled_config(8), MemoryTransport::new());
        assert!(strip.connected());
        strip.set_led(0, RED, 16).unwrap();

        assert!(strip.show());

        let transport = strip.transport();
        let frame = transport.last_frame().unwrap();
        assert_eq!(frame.len(), 4 + 8 * 4 + 1);

        // Four-byte zero header.
        assert_eq!(&frame[..4], &[0, 0, 0, 0]);
        // First LED: flagged brightness byte, then blue, green, red.
        assert_eq!(&frame[4..8], &[0xE0 | 16, 0, 0, 255]);
        // Untouched LEDs transmit the clear state.
        assert_eq!(&frame[8..12], &[0xE0 | MAX_BRIGHTNESS, 0, 0, 0]);
        // End-of-frame clock train: ceil(8 / 16) bytes of 0xFF.
        assert_eq!(&frame[36..], &[0xFF]);
    }

    #[test]
    fn test_footer_length_follows_the_led_count() {
        let mut strip = LedStrip::new(&enabled_config(17), MemoryTransport::new());
        assert!(strip.show());
        let frame_len = strip.transport().last_frame().unwrap().len();
        assert_eq!(frame_len, 4 + 17 * 4 + 2);
    }

    #[test]
    fn test_show_fails_when_disabled_or_disconnected() {
        let mut strip = LedStrip::new(
            &StripConfig {
                count: 4,
                enabled: false,
                ..StripConfig::default()
            },
            MemoryTransport::new(),
        );
        assert!(!strip.connected());
        assert!(!strip.show());
        assert_eq!(strip.transport().frame_count(), 0);
    }

    #[test]
    fn test_device_open_failure_leaves_strip_disconnected() {
        let mut transport = MemoryTransport::new();
        transport.set_fail_connects(true);

        let mut strip = LedStrip::new(&enabled_config(4), transport);
        assert!(strip.enabled());
        assert!(!strip.connected());
        assert!(!strip.show());
    }

    #[test]
    fn test_short_transfer_fails_show() {
        let mut transport = MemoryTransport::new();
        transport.set_truncate_writes_by(1);

        let mut strip = LedStrip::new(&enabled_config(4), transport);
        strip.set_led(2, RED, 5).unwrap();

        assert!(!strip.show());
        // The buffer itself is untouched by the failed transmit.
        assert_eq!(strip.color(2).unwrap(), RED);
    }

    #[test]
    fn test_count_change_while_enabled_reconnects() {
        let mut strip = LedStrip::new(&enabled_config(8), MemoryTransport::new());
        assert_eq!(strip.transport().connects(), 1);

        strip.set_count(32).unwrap();
        assert_eq!(strip.count(), 32);
        assert_eq!(strip.transport().connects(), 2);

        assert!(strip.show());
        let frame_len = strip.transport().last_frame().unwrap().len();
        assert_eq!(frame_len, 4 + 32 * 4 + 2);
    }

    #[test]
    fn test_count_is_bounded_to_one() {
        let mut strip = LedStrip::new(&enabled_config(4), MemoryTransport::new());
        strip.set_count(0).unwrap();
        assert_eq!(strip.count(), 1);
    }

    #[test]
    fn test_gamma_correction_applies_at_transmit_only() {
        let mut strip = LedStrip::new(&enabled_config(1), MemoryTransport::new());
        let color = Rgb {
            r: 10,
            g: 100,
            b: 200,
        };
        strip.set_led(0, color, MAX_BRIGHTNESS).unwrap();

        strip.set_gamma_correction(true);

        // The stored pixel is never mutated by correction.
        assert_eq!(strip.color(0).unwrap(), color);

        let lut = gamma_lut(strip.gamma());
        let transport = strip.transport();
        let frame = transport.last_frame().unwrap();
        assert_eq!(
            &frame[4..8],
            &[
                0xE0 | MAX_BRIGHTNESS,
                lut[usize::from(color.b)],
                lut[usize::from(color.g)],
                lut[usize::from(color.r)],
            ]
        );
    }

    #[test]
    fn test_hsv_brightness_substitutes_the_transmitted_field() {
        let mut strip = LedStrip::new(&enabled_config(1), MemoryTransport::new());
        strip
            .set_led(
                0,
                Rgb {
                    r: 128,
                    g: 0,
                    b: 0,
                },
                MAX_BRIGHTNESS,
            )
            .unwrap();

        strip.set_hsv_brightness(true);

        // Stored brightness is untouched...
        assert_eq!(strip.brightness(0).unwrap(), MAX_BRIGHTNESS);
        // ...but the wire carries round(31 * 128 / 255) = 16.
        let transport = strip.transport();
        let frame = transport.last_frame().unwrap();
        assert_eq!(frame[4], 0xE0 | 16);
    }

    #[test]
    fn test_save_restore_round_trip_through_the_strip() {
        let mut strip = LedStrip::new(&enabled_config(4), MemoryTransport::new());
        strip.fill(0, 3, RED, 20).unwrap();
        strip.save().unwrap();
        assert!(strip.can_restore());

        strip.clear();
        strip
            .restore(shelflight::RestoreScope::Color)
            .unwrap();

        assert_eq!(strip.color(0).unwrap(), RED);
        // Brightness was reset by clear and color-only restore keeps it.
        assert_eq!(strip.brightness(0).unwrap(), MAX_BRIGHTNESS);
        assert!(!strip.can_restore());
    }
}
