//! Scripted scenario runner.

use std::{path::PathBuf, sync::Arc};

use parking_lot::Mutex;
use tracing::info;
use traypop::{
    Collaborators, Controller, IconEvent, Modifiers, Notification, OsFamily, Positioner,
    RawOptions, WindowId,
};

use crate::{
    cli::Step,
    desktop::{SimDesktop, SimHost},
    error::{Error, Result},
};

/// Outcome of a scenario run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Every notification emitted, in order.
    pub notifications: Vec<Notification>,
    /// Whether the popup is visible at the end.
    pub visible: bool,
    /// Identity of the live popup at the end, if any.
    pub window: Option<WindowId>,
    /// Windows created over the whole run.
    pub windows_created: usize,
}

/// Initialise a controller over `desktop`, apply `steps` one at a time, and
/// then stop the driver.
pub async fn run(
    raw: RawOptions,
    os: OsFamily,
    root: PathBuf,
    desktop: &SimDesktop,
    steps: &[Step],
) -> Result<Report> {
    let deps = Collaborators::new(
        Arc::new(SimHost::new(root)),
        Arc::new(desktop.clone()),
        Arc::new(Positioner::new(desktop.work_area())),
    )
    .with_os(os);
    let mut controller = Controller::initialize(raw, deps)?;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    controller.on_any(move |n| {
        info!(notification = %n, "notification");
        log.lock().push(n);
    });
    controller.process_pending()?;

    let handle = controller.handle();
    for (i, step) in steps.iter().enumerate() {
        let step_no = i + 1;
        info!(step = step_no, action = ?step, "step");
        let applied = match step {
            Step::Click => desktop.fire_icon(IconEvent::Click, Modifiers::default()),
            Step::RightClick => desktop.fire_icon(IconEvent::RightClick, Modifiers::default()),
            Step::DoubleClick => desktop.fire_icon(IconEvent::DoubleClick, Modifiers::default()),
            Step::AltClick => desktop.fire_icon(
                IconEvent::Click,
                Modifiers {
                    alt: true,
                    ..Modifiers::default()
                },
            ),
            Step::Show => {
                handle.show(None)?;
                true
            }
            Step::Hide => {
                handle.hide()?;
                true
            }
            Step::Blur => desktop.blur(),
            Step::Close => desktop.close(),
        };
        if !applied {
            return Err(match step {
                Step::Blur | Step::Close => Error::NoWindow { step: step_no },
                _ => Error::NoIcon { step: step_no },
            });
        }
        controller.process_pending()?;
    }

    handle.shutdown()?;
    controller.run().await?;

    let notifications = seen.lock().clone();
    Ok(Report {
        notifications,
        visible: controller.is_visible(),
        window: controller.window_id(),
        windows_created: desktop.window_count(),
    })
}
