//! Click-driven show/hide behaviour and anchoring, end to end over the
//! recording doubles.

use traypop::{
    Activation, IconEvent, Modifiers, Notification, OsFamily, Placement, Point, RawOptions, Rect,
    Size,
    test_support::{Harness, record_notifications},
};

fn raw() -> RawOptions {
    RawOptions {
        base_dir: Some("/app".into()),
        width: Some(300),
        height: Some(200),
        ..RawOptions::default()
    }
}

const ICON: Rect = Rect::new(500, 10, 24, 24);

/// Route controller logs through the test harness; `RUST_LOG` picks the level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();
}

#[test]
fn click_toggles_the_window() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    let icon = h.icon();

    icon.click(Some(ICON));
    c.process_pending().unwrap();
    assert!(c.is_visible());

    icon.click(Some(ICON));
    c.process_pending().unwrap();
    assert!(!c.is_visible());

    icon.click(Some(ICON));
    c.process_pending().unwrap();
    assert!(c.is_visible());
    assert_eq!(h.system.window_count(), 1);
}

#[test]
fn double_click_behaves_like_the_trigger() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    h.icon().fire(IconEvent::DoubleClick, Activation::at(ICON));
    c.process_pending().unwrap();
    assert!(c.is_visible());
}

#[test]
fn modifier_click_only_ever_hides() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    let icon = h.icon();
    let alt = Modifiers {
        alt: true,
        ..Modifiers::default()
    };
    let shift = Modifiers {
        shift: true,
        ..Modifiers::default()
    };

    // Hidden (no window at all): stays hidden, nothing gets created.
    icon.click_with(shift, Some(ICON));
    c.process_pending().unwrap();
    assert!(!c.is_visible());
    assert_eq!(h.system.window_count(), 0);

    icon.click(Some(ICON));
    c.process_pending().unwrap();
    assert!(c.is_visible());

    icon.click_with(alt, Some(ICON));
    c.process_pending().unwrap();
    assert!(!c.is_visible());
    assert!(c.window().is_some());
}

#[test]
fn hide_without_window_emits_nothing() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    let log = record_notifications(&mut c);
    c.hide_window().unwrap();
    c.hide_window().unwrap();
    assert!(log.lock().is_empty());
    assert_eq!(h.system.window_count(), 0);
}

#[test]
fn repeated_hide_keeps_window_hidden() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    c.show_window(None).unwrap();
    c.hide_window().unwrap();
    c.hide_window().unwrap();
    assert!(!c.is_visible());
    assert!(c.window().is_some());
}

#[test]
fn show_notifications_are_ordered() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    let log = record_notifications(&mut c);
    c.show_window(Some(ICON)).unwrap();
    c.show_window(Some(ICON)).unwrap();
    c.hide_window().unwrap();
    assert_eq!(
        *log.lock(),
        vec![
            Notification::CreateWindow,
            Notification::AfterCreateWindow,
            Notification::Show,
            Notification::AfterShow,
            Notification::Show,
            Notification::AfterShow,
            Notification::Hide,
            Notification::AfterHide,
        ]
    );
}

#[test]
fn channel_subscribers_see_only_their_channel() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    let shows = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let s = shows.clone();
    c.on(Notification::AfterShow, move || {
        s.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    });
    c.show_window(None).unwrap();
    c.hide_window().unwrap();
    c.show_window(None).unwrap();
    assert_eq!(shows.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[test]
fn click_bounds_are_cached_for_later_shows() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    let rect = Rect::new(100, 50, 22, 22);

    h.icon().click(Some(rect));
    c.process_pending().unwrap();
    assert_eq!(c.cached_anchor(), Some(rect));
    c.hide_window().unwrap();

    c.show_window(None).unwrap();
    let call = h.resolver.last().unwrap();
    assert_eq!(call.placement, Placement::AnchorCenter);
    assert_eq!(call.anchor, Some(rect));
}

#[test]
fn degenerate_click_bounds_are_not_cached() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    h.icon().click(Some(ICON));
    c.process_pending().unwrap();
    h.icon().click(None);
    c.process_pending().unwrap();

    h.icon().click(Some(Rect::new(0, 0, 0, 0)));
    c.process_pending().unwrap();
    assert!(c.is_visible());
    assert_eq!(c.cached_anchor(), Some(ICON));
    assert_eq!(h.resolver.last().unwrap().anchor, Some(ICON));
}

#[test]
fn missing_anchor_falls_back_to_platform_corner() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    c.show_window(None).unwrap();
    let call = h.resolver.last().unwrap();
    assert_eq!(call.placement, Placement::TopRight);
    assert_eq!(call.anchor, None);
    assert_eq!(
        h.window().position(),
        Some(h.resolver.expected(Placement::TopRight, None, Size::new(300, 200)))
    );

    let h = Harness::ready().os(OsFamily::Windows);
    let mut c = h.ready_controller(raw()).unwrap();
    c.show_window(None).unwrap();
    assert_eq!(h.resolver.last().unwrap().placement, Placement::BottomRight);
}

#[test]
fn degenerate_explicit_anchor_uses_the_corner() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    c.show_window(Some(Rect::new(0, 0, 0, 0))).unwrap();
    assert_eq!(h.resolver.last().unwrap().placement, Placement::TopRight);
    assert_eq!(c.cached_anchor(), None);
}

#[test]
fn screen_placements_need_no_anchor() {
    let h = Harness::ready();
    let mut c = h
        .ready_controller(RawOptions {
            placement: Some("center".into()),
            ..raw()
        })
        .unwrap();
    c.show_window(None).unwrap();
    assert_eq!(h.resolver.last().unwrap().placement, Placement::Center);
}

#[test]
fn icon_bounds_are_queried_when_nothing_is_cached() {
    let h = Harness::ready();
    let rect = Rect::new(800, 0, 22, 22);
    h.system.set_icon_bounds(Some(rect));
    let mut c = h.ready_controller(raw()).unwrap();

    c.show_window(None).unwrap();
    let call = h.resolver.last().unwrap();
    assert_eq!(call.placement, Placement::AnchorCenter);
    assert_eq!(call.anchor, Some(rect));
    assert_eq!(c.cached_anchor(), Some(rect));
}

#[test]
fn degenerate_icon_bounds_use_the_corner() {
    let h = Harness::ready();
    h.system.set_icon_bounds(Some(Rect::new(0, 0, 22, 22)));
    let mut c = h.ready_controller(raw()).unwrap();

    c.show_window(None).unwrap();
    assert_eq!(h.resolver.last().unwrap().placement, Placement::TopRight);
    assert_eq!(c.cached_anchor(), None);
    assert!(c.is_visible());
}

#[test]
fn fixed_coordinate_overrides_one_axis() {
    let h = Harness::ready();
    let mut c = h
        .ready_controller(RawOptions {
            x: Some(10),
            ..raw()
        })
        .unwrap();
    c.show_window(Some(ICON)).unwrap();
    let resolved = h
        .resolver
        .expected(Placement::AnchorCenter, Some(ICON), Size::new(300, 200));
    assert_eq!(h.window().position(), Some(Point::new(10, resolved.y)));
}

#[test]
fn option_changes_apply_to_the_next_show() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    c.set_option("windowPosition", "top-left").unwrap();
    c.show_window(Some(ICON)).unwrap();
    assert_eq!(h.resolver.last().unwrap().placement, Placement::TopLeft);
    assert_eq!(h.window().position(), Some(Point::new(0, 25)));
}

#[test]
fn events_before_readiness_are_dropped() {
    let h = Harness::new();
    let mut c = h.controller(raw()).unwrap();
    let handle = c.handle();
    handle.show(Some(ICON)).unwrap();
    assert_eq!(c.process_pending().unwrap(), 1);
    assert_eq!(h.system.window_count(), 0);

    h.host.fire_ready();
    c.process_pending().unwrap();
    handle.show(Some(ICON)).unwrap();
    c.process_pending().unwrap();
    assert!(c.is_visible());
}

#[test]
fn tray_click_scenario() {
    init_tracing();
    let h = Harness::new();
    let mut c = h.controller(raw()).unwrap();
    let log = record_notifications(&mut c);
    h.host.fire_ready();
    c.process_pending().unwrap();
    assert_eq!(*log.lock(), vec![Notification::Ready]);
    log.lock().clear();

    let icon = h.icon();
    icon.click(Some(ICON));
    c.process_pending().unwrap();
    assert_eq!(
        *log.lock(),
        vec![
            Notification::CreateWindow,
            Notification::AfterCreateWindow,
            Notification::Show,
            Notification::AfterShow,
        ]
    );
    let w = h.window();
    assert_eq!(w.content().as_deref(), Some("file:///app/index.html"));
    assert_eq!(w.position(), Some(Point::new(362, 25)));
    assert!(w.visible());

    log.lock().clear();
    icon.click(None);
    c.process_pending().unwrap();
    assert_eq!(
        *log.lock(),
        vec![Notification::Hide, Notification::AfterHide]
    );
    assert!(c.window().is_some());
    assert!(!w.visible());

    log.lock().clear();
    w.close();
    c.process_pending().unwrap();
    assert_eq!(*log.lock(), vec![Notification::AfterClose]);
    assert!(c.window().is_none());
}

#[tokio::test(flavor = "current_thread")]
async fn run_drives_handle_requests_until_shutdown() {
    init_tracing();
    let h = Harness::ready();
    let mut c = h.controller(raw()).unwrap();
    let handle = c.handle();
    let log = record_notifications(&mut c);

    handle.show(Some(ICON)).unwrap();
    handle.hide().unwrap();
    handle.show(None).unwrap();
    handle.shutdown().unwrap();
    c.run().await.unwrap();

    assert!(c.is_visible());
    assert_eq!(h.system.window_count(), 1);
    assert_eq!(log.lock().first(), Some(&Notification::Ready));
    assert_eq!(log.lock().last(), Some(&Notification::AfterShow));
    // The second show reused the cached click position.
    assert_eq!(h.resolver.last().unwrap().anchor, Some(ICON));
}

#[test]
fn handle_reports_a_dropped_controller() {
    let h = Harness::ready();
    let c = h.controller(raw()).unwrap();
    let handle = c.handle();
    drop(c);
    assert!(matches!(handle.hide(), Err(traypop::Error::ChannelClosed)));
}
