//! Command-line interface definitions for traypop-sim.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use logging::LogArgs;
use traypop::OsFamily;

/// Command-line interface for the `traypop-sim` binary.
#[derive(Parser, Debug)]
#[command(
    name = "traypop-sim",
    about = "Drive the popup controller against a simulated desktop",
    version
)]
pub struct Cli {
    /// Logging controls shared across traypop binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// Optional path to a popup configuration file (RON).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Platform policy to simulate (defaults to the host's).
    #[arg(long, value_enum)]
    pub os: Option<OsArg>,

    /// Screen size as WIDTHxHEIGHT.
    #[arg(long, default_value = "1920x1080", value_parser = parse_screen)]
    pub screen: (u32, u32),

    /// Height of the menu bar or taskbar removed from the work area.
    #[arg(long, default_value_t = 25)]
    pub bar: u32,

    /// Horizontal position of the status icon.
    #[arg(long, default_value_t = 1500)]
    pub icon_x: i32,

    /// Scenario steps, applied in order. Defaults to a short tour.
    #[arg(value_enum, value_name = "STEP", num_args = 0..)]
    pub steps: Vec<Step>,
}

/// Platform families selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OsArg {
    /// macOS policy: dock presence, top-right fallback.
    Macos,
    /// Windows policy: taskbar-bottom anchoring, bottom-right fallback.
    Windows,
    /// Linux policy.
    Linux,
}

impl From<OsArg> for OsFamily {
    fn from(v: OsArg) -> Self {
        match v {
            OsArg::Macos => Self::MacOs,
            OsArg::Windows => Self::Windows,
            OsArg::Linux => Self::Linux,
        }
    }
}

/// One scripted interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Step {
    /// Primary click on the status icon.
    Click,
    /// Secondary click on the status icon.
    RightClick,
    /// Double click on the status icon.
    DoubleClick,
    /// Primary click with the alt modifier held.
    AltClick,
    /// Programmatic show request.
    Show,
    /// Programmatic hide request.
    Hide,
    /// The popup loses focus.
    Blur,
    /// The popup is closed from outside.
    Close,
}

impl Step {
    /// Scenario used when no steps are given.
    pub const DEFAULT_TOUR: [Self; 7] = [
        Self::Click,
        Self::Click,
        Self::Show,
        Self::Blur,
        Self::Click,
        Self::AltClick,
        Self::Close,
    ];
}

fn parse_screen(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let h = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_sizes_parse() {
        assert_eq!(parse_screen("1280x800"), Ok((1280, 800)));
        assert!(parse_screen("1280").is_err());
        assert!(parse_screen("wide x tall").is_err());
    }

    #[test]
    fn steps_parse_in_kebab_case() {
        let cli = Cli::try_parse_from(["traypop-sim", "--os", "windows", "click", "alt-click"])
            .unwrap();
        assert_eq!(cli.steps, vec![Step::Click, Step::AltClick]);
        assert_eq!(cli.os.map(OsFamily::from), Some(OsFamily::Windows));
        assert_eq!(cli.screen, (1920, 1080));
    }
}
