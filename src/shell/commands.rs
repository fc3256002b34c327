//! The standard command set.

use std::io::Write;

use crate::error::OntobotResult;
use crate::world::World;

use super::{Command, Outcome};

/// The commands of the shell, in the order `help` lists them.
pub fn standard() -> Vec<Box<dyn Command>> {
    vec![
        Box::new(HelpCommand),
        Box::new(ThingsCommand),
        Box::new(StateCommand),
        Box::new(CapsCommand),
        Box::new(RequireCommand),
        Box::new(PutCommand),
        Box::new(ExitCommand),
    ]
}

fn usage(command: &dyn Command, out: &mut dyn Write) -> OntobotResult<Outcome> {
    writeln!(out, "usage: {}", command.usage())?;
    Ok(Outcome::Continue)
}

struct HelpCommand;

impl Command for HelpCommand {
    fn name(&self) -> &'static str {
        "help"
    }
    fn usage(&self) -> &'static str {
        "help"
    }
    fn description(&self) -> &'static str {
        "show this description"
    }
    fn run(&self, _world: &World, _args: &[&str], _out: &mut dyn Write) -> OntobotResult<Outcome> {
        Ok(Outcome::ShowHelp)
    }
}

struct ThingsCommand;

impl Command for ThingsCommand {
    fn name(&self) -> &'static str {
        "things"
    }
    fn usage(&self) -> &'static str {
        "things"
    }
    fn description(&self) -> &'static str {
        "list all things in the world model"
    }
    fn run(&self, world: &World, _args: &[&str], out: &mut dyn Write) -> OntobotResult<Outcome> {
        let rows = world.things()?;
        if rows.is_empty() {
            writeln!(out, "No things in the world model.")?;
            return Ok(Outcome::Continue);
        }
        writeln!(out, "Things ({}):", rows.len())?;
        for row in &rows {
            let class = row.class.as_ref().map_or("?", |c| c.name());
            match &row.position {
                Some(position) => writeln!(out, "  {} [{}] at {}", row.thing, class, position)?,
                None => writeln!(out, "  {} [{}]", row.thing, class)?,
            }
        }
        Ok(Outcome::Continue)
    }
}

struct StateCommand;

impl Command for StateCommand {
    fn name(&self) -> &'static str {
        "state"
    }
    fn usage(&self) -> &'static str {
        "state <thing>"
    }
    fn description(&self) -> &'static str {
        "show classes, position and event history of a thing"
    }
    fn run(&self, world: &World, args: &[&str], out: &mut dyn Write) -> OntobotResult<Outcome> {
        let [name] = args else {
            return usage(self, out);
        };
        let report = world.thing_report(name)?;

        writeln!(out, "Thing: \"{}\"", report.thing)?;
        let classes: Vec<&str> = report.classes.iter().map(|c| c.name()).collect();
        writeln!(out, "  classes:  {}", classes.join(" -> "))?;
        match &report.position {
            Some(position) => writeln!(out, "  position: {position}")?,
            None => writeln!(out, "  position: (none)")?,
        }
        if report.history.is_empty() {
            writeln!(out, "  history:  (none)")?;
        } else {
            let history: Vec<&str> = report.history.iter().map(|e| e.name()).collect();
            writeln!(out, "  history:  {}", history.join(" -> "))?;
            if let Some(state) = report.current_state() {
                writeln!(out, "  state:    {state}")?;
            }
        }
        if !report.detached.is_empty() {
            let detached: Vec<&str> = report.detached.iter().map(|e| e.name()).collect();
            writeln!(out, "  detached: {}", detached.join(", "))?;
        }
        Ok(Outcome::Continue)
    }
}

struct CapsCommand;

impl Command for CapsCommand {
    fn name(&self) -> &'static str {
        "caps"
    }
    fn usage(&self) -> &'static str {
        "caps"
    }
    fn description(&self) -> &'static str {
        "list capabilities and whether the robot has them"
    }
    fn run(&self, world: &World, _args: &[&str], out: &mut dyn Write) -> OntobotResult<Outcome> {
        let rows = world.capabilities()?;
        if rows.is_empty() {
            writeln!(out, "No capabilities in the world model.")?;
            return Ok(Outcome::Continue);
        }
        writeln!(out, "Capabilities ({}):", rows.len())?;
        for row in &rows {
            let mark = if row.possessed { "possessed" } else { "missing" };
            writeln!(out, "  {} [{}]", row.class, mark)?;
        }
        Ok(Outcome::Continue)
    }
}

struct RequireCommand;

impl Command for RequireCommand {
    fn name(&self) -> &'static str {
        "require"
    }
    fn usage(&self) -> &'static str {
        "require <capability>"
    }
    fn description(&self) -> &'static str {
        "resolve a capability's component requirements"
    }
    fn run(&self, world: &World, args: &[&str], out: &mut dyn Write) -> OntobotResult<Outcome> {
        let [name] = args else {
            return usage(self, out);
        };
        let report = world.require(name)?;

        write!(out, "{}", report.resolution.render())?;
        writeln!(
            out,
            "Minimal configuration ({} components):",
            report.resolution.components.len()
        )?;
        for component in &report.resolution.components {
            writeln!(out, "  {component}")?;
        }
        if report.resolution.capabilities.len() > 1 {
            let capabilities: Vec<&str> = report
                .resolution
                .capabilities
                .iter()
                .map(|c| c.name())
                .collect();
            writeln!(out, "Capabilities involved: {}", capabilities.join(", "))?;
        }
        if report.missing.is_empty() {
            writeln!(out, "Missing components: none")?;
        } else {
            let missing: Vec<&str> = report.missing.iter().map(|c| c.name()).collect();
            writeln!(out, "Missing components: {}", missing.join(", "))?;
        }
        Ok(Outcome::Continue)
    }
}

struct PutCommand;

impl Command for PutCommand {
    fn name(&self) -> &'static str {
        "put"
    }
    fn usage(&self) -> &'static str {
        "put <thing> <position>"
    }
    fn description(&self) -> &'static str {
        "move a thing to a position"
    }
    fn run(&self, world: &World, args: &[&str], out: &mut dyn Write) -> OntobotResult<Outcome> {
        let [thing, position] = args else {
            return usage(self, out);
        };
        let action = world.put(thing, position)?;
        writeln!(out, "Moved \"{thing}\" to \"{position}\" via {action}.")?;
        Ok(Outcome::Continue)
    }
}

struct ExitCommand;

impl Command for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }
    fn usage(&self) -> &'static str {
        "exit"
    }
    fn description(&self) -> &'static str {
        "leave the shell"
    }
    fn run(&self, _world: &World, _args: &[&str], _out: &mut dyn Write) -> OntobotResult<Outcome> {
        Ok(Outcome::Exit)
    }
}
