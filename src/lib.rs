//! Core library for `container-publish`, a CLI tool that takes a
//! locally built container image archive and publishes it to a
//! registry under any number of destination tags. It orchestrates an
//! external container runtime client (docker or podman) and owns none
//! of the image storage or registry protocol itself.

use std::process::Command;

use log::trace;
use miette::{miette, Result};

pub mod commands;
pub mod drivers;
pub mod logging;

mod macros;

/// Checks for the existance of a given command.
///
/// # Errors
/// Will error if the command doesn't exist.
pub fn check_command_exists(command: &str) -> Result<()> {
    trace!("check_command_exists({command})");

    trace!("which {command}");
    if Command::new("which")
        .arg(command)
        .output()
        .is_ok_and(|out| out.status.success())
    {
        trace!("Command {command} does exist");
        Ok(())
    } else {
        Err(miette!(
            "Command {command} doesn't exist and is required to publish the image"
        ))
    }
}
