use log::{info, trace};
use miette::{bail, IntoDiagnostic, Result};
use semver::Version;
use serde::Deserialize;

use crate::cmd;

use super::{
    opts::{LoadOpts, PushAllOpts, TagOpts},
    DriverVersion, PublishDriver,
};

#[derive(Debug, Deserialize)]
struct DockerVersionJsonClient {
    #[serde(alias = "Version")]
    pub version: Version,
}

#[derive(Debug, Deserialize)]
struct DockerVersionJson {
    #[serde(alias = "Client")]
    pub client: DockerVersionJsonClient,
}

#[derive(Debug)]
pub struct DockerDriver;

impl DriverVersion for DockerDriver {
    // First docker version to support `push --all-tags`
    // https://docs.docker.com/engine/release-notes/20.10/
    const VERSION_REQ: &'static str = ">=20.10";

    fn version() -> Result<Version> {
        trace!("DockerDriver::version()");

        trace!("docker version -f json");
        let output = cmd!("docker", "version", "-f", "json")
            .output()
            .into_diagnostic()?;

        let version_json: DockerVersionJson =
            serde_json::from_slice(&output.stdout).into_diagnostic()?;

        Ok(version_json.client.version)
    }
}

impl PublishDriver for DockerDriver {
    fn load(opts: &LoadOpts) -> Result<()> {
        trace!("DockerDriver::load({opts:#?})");

        trace!("docker load --input {}", opts.archive.display());
        let output = cmd!("docker", "load", "--input", opts.archive.as_ref())
            .output()
            .into_diagnostic()?;

        if output.status.success() {
            info!(
                "Successfully loaded {} as {}",
                opts.archive.display(),
                opts.image
            );
        } else {
            bail!(
                "Failed to load image archive {}:\n{}",
                opts.archive.display(),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(())
    }

    fn tag(opts: &TagOpts) -> Result<()> {
        trace!("DockerDriver::tag({opts:#?})");

        trace!("docker tag {} {}", opts.src_image, opts.dest_image);
        let status = cmd!(
            "docker",
            "tag",
            opts.src_image.as_ref(),
            opts.dest_image.as_ref(),
        )
        .status()
        .into_diagnostic()?;

        if status.success() {
            info!("Successfully tagged {}!", opts.dest_image);
        } else {
            bail!("Failed to tag image {}", opts.dest_image);
        }
        Ok(())
    }

    fn push_all_tags(opts: &PushAllOpts) -> Result<()> {
        trace!("DockerDriver::push_all_tags({opts:#?})");

        trace!("docker push --all-tags {}", opts.repository);
        let status = cmd!("docker", "push", "--all-tags", opts.repository.as_ref())
            .status()
            .into_diagnostic()?;

        if status.success() {
            info!("Successfully pushed all tags for {}!", opts.repository);
        } else {
            bail!("Failed to push tags for {}", opts.repository);
        }
        Ok(())
    }
}
