//! Contains the formatting logic for the reports produced by the [RestackContext].
//!
//! [RestackContext]: super::RestackContext

use super::StepAction;
use itertools::Itertools;
use nu_ansi_term::Color;
use std::fmt::{Display, Formatter, Result};

impl Display for StepAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Reparented {
                branch,
                base,
                children,
            } if children.is_empty() => write!(
                f,
                "Untracked deleted branch `{}` (no children to move onto `{}`)",
                Color::Red.paint(branch),
                Color::Yellow.paint(base)
            ),
            Self::Reparented {
                branch,
                base,
                children,
            } => write!(
                f,
                "Reparenting `{}`'s children ({}) to `{}`",
                Color::Red.paint(branch),
                children.iter().map(|c| Color::Green.paint(c)).join(", "),
                Color::Yellow.paint(base)
            ),
            Self::Restacked { branch, base } => write!(
                f,
                "Restacking `{}` on top of `{}`",
                Color::Green.paint(branch),
                Color::Yellow.paint(base)
            ),
        }
    }
}
