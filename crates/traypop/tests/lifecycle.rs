use traypop::{
    ClickTrigger, Collaborators, Controller, Error, HighlightMode, IconEvent, IconSource,
    Notification, OsFamily, RawOptions, Size,
    test_support::{Harness, MockIcon, record_notifications},
};

fn raw() -> RawOptions {
    RawOptions {
        base_dir: Some("/app".into()),
        width: Some(300),
        height: Some(200),
        ..RawOptions::default()
    }
}

#[test]
fn nothing_is_created_before_readiness() {
    let h = Harness::new();
    let mut c = h.controller(raw()).unwrap();

    assert_eq!(h.host.pending_callbacks(), 1);
    assert!(!c.is_ready());
    assert!(h.system.icons().is_empty());
    assert_eq!(h.system.window_count(), 0);
    assert!(matches!(c.show_window(None), Err(Error::NotReady)));
    assert!(matches!(c.hide_window(), Err(Error::NotReady)));

    let log = record_notifications(&mut c);
    h.host.fire_ready();
    assert_eq!(c.process_pending().unwrap(), 1);

    assert!(c.is_ready());
    assert_eq!(h.system.icons().len(), 1);
    assert_eq!(h.system.window_count(), 0);
    assert_eq!(*log.lock(), vec![Notification::Ready]);
}

#[test]
fn ready_host_queues_readiness_for_first_pump() {
    let h = Harness::ready();
    let mut c = h.controller(raw()).unwrap();
    let log = record_notifications(&mut c);

    assert!(!h.host.calls.contains("on_ready"));
    assert!(!c.is_ready());
    c.process_pending().unwrap();
    assert!(c.is_ready());
    // Subscribers registered right after initialize still see `ready`.
    assert_eq!(*log.lock(), vec![Notification::Ready]);
}

#[test]
fn readiness_runs_at_most_once() {
    let h = Harness::ready();
    let mut c = h.controller(raw()).unwrap();
    let log = record_notifications(&mut c);
    c.process_pending().unwrap();
    c.dispatch(traypop::ControllerEvent::Ready).unwrap();
    assert_eq!(h.system.calls.count("create_icon"), 1);
    assert_eq!(*log.lock(), vec![Notification::Ready]);
}

#[test]
fn icon_gets_trigger_and_double_click_handlers() {
    let h = Harness::ready();
    let _c = h.ready_controller(raw()).unwrap();
    let icon = h.icon();
    assert_eq!(icon.handler_count(IconEvent::Click), 1);
    assert_eq!(icon.handler_count(IconEvent::DoubleClick), 1);
    assert_eq!(icon.handler_count(IconEvent::RightClick), 0);
    assert_eq!(icon.tooltip().as_deref(), Some(""));

    let h = Harness::ready();
    let _c = h
        .ready_controller(RawOptions {
            click_trigger: Some(ClickTrigger::Secondary),
            tooltip: Some("Weather".into()),
            ..raw()
        })
        .unwrap();
    let icon = h.icon();
    assert_eq!(icon.handler_count(IconEvent::Click), 0);
    assert_eq!(icon.handler_count(IconEvent::RightClick), 1);
    assert_eq!(icon.handler_count(IconEvent::DoubleClick), 1);
    assert_eq!(icon.tooltip().as_deref(), Some("Weather"));
}

#[test]
fn missing_icon_files_fall_back_to_bundled_image() {
    let h = Harness::ready();
    let _c = h
        .ready_controller(RawOptions {
            icon: Some("/app/nope.png".into()),
            ..raw()
        })
        .unwrap();
    assert!(matches!(h.icon().source(), Some(IconSource::Bundled(_))));
}

#[test]
fn injected_icon_is_used_as_is() {
    let h = Harness::ready();
    let icon = MockIcon::new(None, h.system.calls.clone());
    let deps = h.collaborators().with_icon(Box::new(icon.clone()));
    let mut c = Controller::initialize(raw(), deps).unwrap();
    c.process_pending().unwrap();

    assert!(!h.system.calls.contains("create_icon"));
    assert_eq!(icon.handler_count(IconEvent::Click), 1);
    icon.click(Some(traypop::Rect::new(500, 0, 24, 24)));
    c.process_pending().unwrap();
    assert!(c.is_visible());
}

#[test]
fn highlight_support_is_recorded_and_used() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    assert!(c.highlight_supported());
    c.show_window(None).unwrap();
    c.hide_window().unwrap();
    assert_eq!(
        h.icon().highlights(),
        vec![
            HighlightMode::Never,
            HighlightMode::Always,
            HighlightMode::Never
        ]
    );
}

#[test]
fn unsupported_highlight_is_not_an_error() {
    let h = Harness::ready();
    h.system.set_icon_highlight_supported(false);
    let mut c = h.ready_controller(raw()).unwrap();
    assert!(c.is_ready());
    assert!(!c.highlight_supported());
    c.show_window(None).unwrap();
    assert!(h.icon().highlights().is_empty());
}

#[test]
fn dock_is_hidden_only_where_it_exists() {
    let h = Harness::ready().os(OsFamily::MacOs);
    let _c = h.ready_controller(raw()).unwrap();
    assert!(h.host.calls.contains("hide_dock"));

    let h = Harness::ready().os(OsFamily::MacOs);
    let _c = h
        .ready_controller(RawOptions {
            show_dock: Some(true),
            ..raw()
        })
        .unwrap();
    assert!(!h.host.calls.contains("hide_dock"));

    let h = Harness::ready().os(OsFamily::Linux);
    let _c = h.ready_controller(raw()).unwrap();
    assert!(!h.host.calls.contains("hide_dock"));
}

#[test]
fn unsupported_dock_hiding_is_recovered() {
    let h = Harness::ready().os(OsFamily::MacOs);
    h.host.set_dock_supported(false);
    let c = h.ready_controller(raw()).unwrap();
    assert!(c.is_ready());
}

#[test]
fn eager_window_is_created_hidden_at_readiness() {
    let h = Harness::ready();
    let mut c = h
        .controller(RawOptions {
            preload_window: Some(true),
            ..raw()
        })
        .unwrap();
    let log = record_notifications(&mut c);
    c.process_pending().unwrap();

    assert_eq!(h.system.window_count(), 1);
    assert!(!c.is_visible());
    assert_eq!(
        *log.lock(),
        vec![
            Notification::CreateWindow,
            Notification::AfterCreateWindow,
            Notification::Ready
        ]
    );
}

#[test]
fn window_is_built_from_narrow_params() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    c.ensure_window().unwrap();
    c.ensure_window().unwrap();
    assert_eq!(h.system.window_count(), 1);

    let w = h.window();
    let p = w.params();
    assert_eq!(p.size, Size::new(300, 200));
    assert!(!p.visible);
    assert!(!p.frame);
    assert!(!p.always_on_top);
    assert!(w.on_all_workspaces());
    assert_eq!(w.content().as_deref(), Some("file:///app/index.html"));
}

#[test]
fn workspace_visibility_follows_option() {
    let h = Harness::ready();
    let mut c = h
        .ready_controller(RawOptions {
            show_on_all_workspaces: Some(false),
            content: Some("https://example.invalid/popup".into()),
            ..raw()
        })
        .unwrap();
    c.ensure_window().unwrap();
    let w = h.window();
    assert!(!w.on_all_workspaces());
    assert_eq!(w.content().as_deref(), Some("https://example.invalid/popup"));
}

#[test]
fn close_clears_the_slot_and_next_show_recreates() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    let log = record_notifications(&mut c);

    c.show_window(None).unwrap();
    c.hide_window().unwrap();
    c.show_window(None).unwrap();
    assert_eq!(h.system.window_count(), 1);
    let first = c.window_id().unwrap();

    h.window().close();
    c.process_pending().unwrap();
    assert!(c.window().is_none());
    assert_eq!(log.lock().last(), Some(&Notification::AfterClose));

    c.show_window(None).unwrap();
    assert_eq!(h.system.window_count(), 2);
    assert!(c.window_id().unwrap() > first);
    assert!(c.is_visible());
}

#[test]
fn stale_window_events_are_ignored() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    c.show_window(None).unwrap();
    let old = h.window();
    old.close();
    c.process_pending().unwrap();
    c.show_window(None).unwrap();

    // A late close from the first window must not clear the second.
    old.close();
    old.blur();
    c.process_pending().unwrap();
    assert!(c.window().is_some());
    assert!(c.is_visible());
}

#[test]
fn blur_hides_unless_kept_on_top() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    c.show_window(None).unwrap();
    let log = record_notifications(&mut c);
    h.window().blur();
    c.process_pending().unwrap();
    assert!(!c.is_visible());
    assert_eq!(*log.lock(), vec![Notification::Hide, Notification::AfterHide]);

    let h = Harness::ready();
    let mut c = h
        .ready_controller(RawOptions {
            keep_on_top: Some(true),
            ..raw()
        })
        .unwrap();
    c.show_window(None).unwrap();
    assert!(h.window().params().always_on_top);
    let log = record_notifications(&mut c);
    h.window().blur();
    c.process_pending().unwrap();
    assert!(c.is_visible());
    assert_eq!(*log.lock(), vec![Notification::FocusLost]);
}

#[test]
fn window_backend_failures_propagate_unchanged() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    h.system.set_fail_create_window(true);
    let err = c.show_window(None).unwrap_err();
    assert!(matches!(err, Error::Backend(_)));
    assert_eq!(err.to_string(), "window creation refused");
    assert!(c.window().is_none());

    h.system.set_fail_create_window(false);
    c.show_window(None).unwrap();
    assert!(c.is_visible());
}

#[test]
fn failed_window_setup_keeps_the_single_window() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    let log = record_notifications(&mut c);
    h.system.set_fail_load_content(true);

    let err = c.show_window(None).unwrap_err();
    assert_eq!(err.to_string(), "content refused");
    assert!(c.window().is_some());
    assert_eq!(*log.lock(), vec![Notification::CreateWindow]);

    c.show_window(None).unwrap();
    assert_eq!(h.system.window_count(), 1);
    assert!(c.is_visible());
}

#[test]
fn invalid_configuration_fails_initialize() {
    let h = Harness::new();
    let err = h
        .controller(RawOptions {
            width: Some(0),
            ..raw()
        })
        .err()
        .unwrap();
    assert!(matches!(err, Error::InvalidConfig(_)));

    let err = h
        .controller(RawOptions {
            placement: Some("trayMiddle".into()),
            ..raw()
        })
        .err()
        .unwrap();
    assert!(matches!(err, Error::UnknownPlacement(_)));
    assert_eq!(h.host.pending_callbacks(), 0);
}

#[test]
fn resolved_options_are_checked_too() {
    let h = Harness::new();
    let mut opts = traypop::Options::resolve(raw(), "/app".as_ref(), OsFamily::Linux).unwrap();
    opts.height = 0;
    let deps: Collaborators = h.collaborators();
    assert!(matches!(
        Controller::with_options(opts, deps),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn options_are_readable_and_writable_by_name() {
    let h = Harness::ready();
    let mut c = h.ready_controller(raw()).unwrap();
    assert_eq!(
        c.get_option("width").unwrap(),
        traypop::OptionValue::Size(300)
    );
    c.set_option("tooltip", "changed").unwrap();
    c.set_option("width", 500).unwrap();
    assert_eq!(c.options().size(), Size::new(500, 200));
    assert!(matches!(
        c.set_option("height", -1),
        Err(Error::OptionType { option: "height", .. })
    ));
    assert_eq!(c.options().tooltip, "changed");
    assert!(matches!(
        c.set_option("nope", true),
        Err(Error::UnknownOption(_))
    ));
}
