//! Command dispatch and the interactive shell.
//!
//! Commands are trait objects in a registry, dispatched on the first
//! whitespace-split token of each input line. The REPL is generic over its
//! input and output streams so whole sessions run in tests.

pub mod commands;

use std::io::{BufRead, Write};

use crate::error::{OntobotResult, ShellError};
use crate::world::World;

/// What the shell should do after a command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading input.
    Continue,
    /// Print the command listing, then keep reading.
    ShowHelp,
    /// End the session.
    Exit,
}

/// A shell command.
pub trait Command {
    /// The dispatch token.
    fn name(&self) -> &'static str;
    /// Invocation synopsis shown by `help`.
    fn usage(&self) -> &'static str;
    /// One-line description shown by `help`.
    fn description(&self) -> &'static str;
    /// Execute with the arguments after the command token.
    fn run(&self, world: &World, args: &[&str], out: &mut dyn Write) -> OntobotResult<Outcome>;
}

/// The command registry and REPL loop.
pub struct Shell {
    commands: Vec<Box<dyn Command>>,
}

impl Shell {
    /// A shell with the standard command set.
    pub fn new() -> Self {
        Self {
            commands: commands::standard(),
        }
    }

    /// Print the command listing.
    pub fn print_help(&self, out: &mut dyn Write) -> OntobotResult<()> {
        writeln!(out, "Available commands:")?;
        for command in &self.commands {
            writeln!(out, "  {:<24} {}", command.usage(), command.description())?;
        }
        Ok(())
    }

    /// Dispatch one input line.
    ///
    /// An empty line is a no-op; an unknown command prints a notice and the
    /// session continues.
    pub fn run_line(
        &self,
        world: &World,
        line: &str,
        out: &mut dyn Write,
    ) -> OntobotResult<Outcome> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((name, args)) = tokens.split_first() else {
            return Ok(Outcome::Continue);
        };

        match self.commands.iter().find(|c| c.name() == *name) {
            Some(command) => command.run(world, args, out),
            None => {
                writeln!(out, "The command you entered was not found. Try `help`.")?;
                Ok(Outcome::Continue)
            }
        }
    }

    /// The REPL: help once on entry, then read and dispatch lines until
    /// `exit` or end of input. Command errors are printed and the session
    /// continues; only I/O failures end it.
    pub fn run(
        &self,
        world: &World,
        input: impl BufRead,
        out: &mut dyn Write,
    ) -> OntobotResult<()> {
        writeln!(out, "ontobot shell over <{}>", world.namespace())?;
        self.print_help(out)?;

        for line in input.lines() {
            let line = line.map_err(|source| ShellError::Io { source })?;
            match self.run_line(world, &line, out) {
                Ok(Outcome::Exit) => break,
                Ok(Outcome::ShowHelp) => self.print_help(out)?,
                Ok(Outcome::Continue) => {}
                Err(err) => writeln!(out, "error: {err}")?,
            }
        }
        Ok(())
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}
