use miette::Result;
use semver::{Version, VersionReq};

use super::opts::{LoadOpts, PushAllOpts, TagOpts};

/// Trait for determining the drivers to run on startup.
pub trait DetermineDriver<T> {
    fn determine_driver(&mut self) -> T;
}

/// Trait for retrieving version of a driver.
pub trait DriverVersion {
    /// The version req string slice that follows
    /// the semver standard <https://semver.org/>.
    const VERSION_REQ: &'static str;

    /// Returns the version of the driver.
    ///
    /// # Errors
    /// Will error if it can't retrieve the version.
    fn version() -> Result<Version>;

    #[must_use]
    fn is_supported_version() -> bool {
        Self::version().is_ok_and(|version| {
            VersionReq::parse(Self::VERSION_REQ).is_ok_and(|req| req.matches(&version))
        })
    }
}

/// Allows agnostic loading, tagging, and pushing of images.
pub trait PublishDriver {
    /// Loads an image archive into the runtime's local store,
    /// making it addressable under the reference it was built with.
    ///
    /// # Errors
    /// Will error if the archive is missing or corrupt, or if
    /// the runtime is unavailable.
    fn load(opts: &LoadOpts) -> Result<()>;

    /// Creates a new reference pointing at the same image
    /// content as the source reference.
    ///
    /// # Errors
    /// Will error if the tagging fails.
    fn tag(opts: &TagOpts) -> Result<()>;

    /// Pushes every tag currently associated with the
    /// repository to the remote registry.
    ///
    /// # Errors
    /// Will error if any push fails.
    fn push_all_tags(opts: &PushAllOpts) -> Result<()>;
}
