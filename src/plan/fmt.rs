//! Formatting for the [RestackPlan] type.

use super::{RestackMode, RestackPlan, RestackStep};
use crate::constants::LEFT_ARROW;
use nu_ansi_term::Color;
use std::fmt::{Display, Formatter, Result};

impl Display for RestackMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Rebase => write!(f, "Rebase"),
            Self::Merge => write!(f, "Merge"),
        }
    }
}

impl Display for RestackStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "{} {} {}",
            Color::Green.paint(&self.branch),
            LEFT_ARROW,
            Color::Yellow.paint(&self.base)
        )?;
        if !self.exists {
            write!(f, " {}", Color::Red.paint("(branch deleted)"))?;
        }
        Ok(())
    }
}

/// A human-readable preview of a [RestackPlan], one step per line in the order they will be applied.
#[derive(Debug, Clone, Copy)]
pub struct Preview<'a> {
    pub(super) plan: &'a RestackPlan,
    pub(super) mode: RestackMode,
}

impl Display for Preview<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Restack preview ({}):", self.mode)?;
        self.plan
            .steps()
            .iter()
            .try_for_each(|step| writeln!(f, "  {}", step))
    }
}
