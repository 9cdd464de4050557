use clap::{crate_authors, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use log::error;
use miette::Result;

pub mod completions;
pub mod publish;

pub trait PublisherCommand {
    /// Runs the command and returns a result
    /// of the execution.
    ///
    /// # Errors
    /// Can return a `miette` Error
    fn try_run(&mut self) -> Result<()>;

    /// Runs the command and exits if there is an error.
    fn run(&mut self) {
        if let Err(e) = self.try_run() {
            error!("{e:?}");
            std::process::exit(1);
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "container-publish",
    about,
    long_about = None,
    author = crate_authors!(),
    version,
)]
pub struct PublisherArgs {
    #[command(subcommand)]
    pub command: CommandArgs,

    #[clap(flatten)]
    pub verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, Subcommand)]
pub enum CommandArgs {
    /// Load a built image archive, apply every destination
    /// tag, and push the tags to the registry.
    Publish(publish::PublishCommand),

    /// Generate shell completions for your shell to stdout
    Completions(completions::CompletionsCommand),
}
