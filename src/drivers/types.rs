use clap::ValueEnum;
use log::trace;

use crate::drivers::{
    docker_driver::DockerDriver, podman_driver::PodmanDriver, DetermineDriver, DriverVersion,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PublishDriverType {
    Docker,
    Podman,
}

impl DetermineDriver<PublishDriverType> for Option<PublishDriverType> {
    fn determine_driver(&mut self) -> PublishDriverType {
        trace!("PublishDriverType::determine_driver()");

        *self.get_or_insert(
            match (
                crate::check_command_exists("docker"),
                crate::check_command_exists("podman"),
            ) {
                (Ok(()), _) if DockerDriver::is_supported_version() => PublishDriverType::Docker,
                (_, Ok(())) if PodmanDriver::is_supported_version() => PublishDriverType::Podman,
                _ => panic!(
                    "{}{}{}",
                    "Could not determine publish strategy, ",
                    format_args!("need either docker version {} ", DockerDriver::VERSION_REQ),
                    format_args!("or podman version {} to continue", PodmanDriver::VERSION_REQ),
                ),
            },
        )
    }
}
