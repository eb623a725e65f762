//! Workflow step progress on stderr

use regscope_core::{StepStatus, WorkflowStep};
use std::io::{IsTerminal, Write};
use std::sync::Mutex;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Prints each step transition once, colored by status
pub struct StepReporter {
    seen: Mutex<Vec<(StepStatus, String)>>,
    color: ColorChoice,
}

impl StepReporter {
    pub fn new() -> Self {
        let color = if std::io::stderr().is_terminal() {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            seen: Mutex::new(Vec::new()),
            color,
        }
    }

    pub fn report(&self, steps: &[WorkflowStep]) {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        seen.resize(steps.len(), (StepStatus::Pending, String::new()));

        let mut stderr = StandardStream::stderr(self.color);
        for (step, last) in steps.iter().zip(seen.iter_mut()) {
            if step.status == StepStatus::Pending
                || (step.status == last.0 && step.message == last.1)
            {
                continue;
            }
            *last = (step.status, step.message.clone());
            write_step(&mut stderr, step, steps.len()).ok();
        }
    }
}

fn write_step(out: &mut StandardStream, step: &WorkflowStep, total: usize) -> std::io::Result<()> {
    let (color, marker) = match step.status {
        StepStatus::Completed => (Color::Green, "done"),
        StepStatus::Failed => (Color::Red, "fail"),
        _ => (Color::Yellow, "...."),
    };
    write!(out, "[{}/{}] ", step.step, total)?;
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{}", marker)?;
    out.reset()?;
    writeln!(out, " {}: {}", step.name, step.message)?;
    out.flush()
}
