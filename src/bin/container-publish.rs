use clap::Parser;
use container_publish::{
    commands::{CommandArgs, PublisherArgs, PublisherCommand},
    logging,
};

fn main() {
    let args = PublisherArgs::parse();

    logging::init_logger(args.verbosity.log_level_filter());

    log::trace!("Parsed arguments: {args:#?}");

    match args.command {
        CommandArgs::Publish(mut command) => command.run(),

        CommandArgs::Completions(mut command) => command.run(),
    }
}
