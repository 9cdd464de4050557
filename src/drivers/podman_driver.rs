use log::{error, info, trace};
use miette::{bail, IntoDiagnostic, Result};
use semver::Version;
use serde::Deserialize;

use crate::cmd;

use super::{
    opts::{LoadOpts, PushAllOpts, TagOpts},
    DriverVersion, PublishDriver,
};

#[derive(Debug, Deserialize)]
struct PodmanVersionJsonClient {
    #[serde(alias = "Version")]
    pub version: Version,
}

#[derive(Debug, Deserialize)]
struct PodmanVersionJson {
    #[serde(alias = "Client")]
    pub client: PodmanVersionJsonClient,
}

#[derive(Debug)]
pub struct PodmanDriver;

impl DriverVersion for PodmanDriver {
    // `podman load` and `podman image ls --format` stabilized
    // well before 4.0, so anything modern will do.
    const VERSION_REQ: &'static str = ">=4";

    fn version() -> Result<Version> {
        trace!("PodmanDriver::version()");

        trace!("podman version -f json");
        let output = cmd!("podman", "version", "-f", "json")
            .output()
            .into_diagnostic()?;

        let version_json: PodmanVersionJson = serde_json::from_slice(&output.stdout)
            .inspect_err(|e| error!("{e}: {}", String::from_utf8_lossy(&output.stdout)))
            .into_diagnostic()?;
        trace!("{version_json:#?}");

        Ok(version_json.client.version)
    }
}

impl PublishDriver for PodmanDriver {
    fn load(opts: &LoadOpts) -> Result<()> {
        trace!("PodmanDriver::load({opts:#?})");

        trace!("podman load --input {}", opts.archive.display());
        let output = cmd!("podman", "load", "--input", opts.archive.as_ref())
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
        trace!("PodmanDriver::tag({opts:#?})");

        trace!("podman tag {} {}", opts.src_image, opts.dest_image);
        let status = cmd!(
            "podman",
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
        trace!("PodmanDriver::push_all_tags({opts:#?})");

        // Podman has no `push --all-tags`, so list the local
        // tags of the repository and push each one.
        trace!("podman image ls --format={{{{.Tag}}}} {}", opts.repository);
        let output = cmd!(
            "podman",
            "image",
            "ls",
            "--format={{.Tag}}",
            opts.repository.as_ref(),
        )
        .output()
        .into_diagnostic()?;

        if !output.status.success() {
            bail!(
                "Failed to list tags for {}:\n{}",
                opts.repository,
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let tags = String::from_utf8(output.stdout).into_diagnostic()?;

        for tag in tags.lines().filter(|line| !line.trim().is_empty()) {
            let image = format!("{}:{tag}", opts.repository);

            trace!("podman push {image}");
            let status = cmd!("podman", "push", &image).status().into_diagnostic()?;

            if status.success() {
                info!("Successfully pushed {image}!");
            } else {
                bail!("Failed to push image {image}");
            }
        }
        Ok(())
    }
}
