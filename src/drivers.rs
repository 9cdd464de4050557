//! This module is responsible for managing the runtime clients used
//! to perform the publishing steps. It hides the implementation
//! details from the command logic so the same publish flow works
//! against docker or podman.

use std::sync::{Mutex, RwLock};

use bon::Builder;
use clap::Args;
use log::trace;
use miette::Result;
use once_cell::sync::Lazy;

use self::{
    docker_driver::DockerDriver,
    opts::{LoadOpts, PushAllOpts, TagOpts},
    podman_driver::PodmanDriver,
    types::PublishDriverType,
};

pub use traits::*;

mod docker_driver;
pub mod opts;
mod podman_driver;
mod traits;
pub mod types;

static INIT: Lazy<Mutex<bool>> = Lazy::new(|| Mutex::new(false));
static SELECTED_PUBLISH_DRIVER: Lazy<RwLock<Option<PublishDriverType>>> =
    Lazy::new(|| RwLock::new(None));

/// Args for selecting the driver to use for runtime.
///
/// If the arg is left uninitialized, the program will determine
/// the best one available.
#[derive(Default, Clone, Copy, Debug, Builder, Args)]
pub struct DriverArgs {
    /// Select which driver to use to load,
    /// tag, and push your image.
    #[arg(short = 'P', long)]
    publish_driver: Option<PublishDriverType>,
}

pub struct Driver;

impl Driver {
    /// Initializes the driver selection.
    ///
    /// Run init at the start of a command before
    /// using any of the publish operations.
    ///
    /// # Panics
    /// Will panic if it is unable to initialize a driver.
    pub fn init(mut args: DriverArgs) {
        trace!("Driver::init()");

        let mut initialized = INIT.lock().expect("Must lock INIT");

        if !*initialized {
            let mut driver = SELECTED_PUBLISH_DRIVER.write().expect("Should lock");
            *driver = Some(args.publish_driver.determine_driver());
            trace!("Driver set {driver:?}");
            drop(driver);

            *initialized = true;
        }
    }

    fn get_publish_driver() -> PublishDriverType {
        let lock = SELECTED_PUBLISH_DRIVER.read().expect("Should read");
        lock.expect("Driver should have been initialized")
    }
}

macro_rules! impl_publish_driver {
    ($func:ident($($args:expr),*)) => {
        match Self::get_publish_driver() {
            PublishDriverType::Docker => DockerDriver::$func($($args,)*),
            PublishDriverType::Podman => PodmanDriver::$func($($args,)*),
        }
    };
}

impl PublishDriver for Driver {
    fn load(opts: &LoadOpts) -> Result<()> {
        impl_publish_driver!(load(opts))
    }

    fn tag(opts: &TagOpts) -> Result<()> {
        impl_publish_driver!(tag(opts))
    }

    fn push_all_tags(opts: &PushAllOpts) -> Result<()> {
        impl_publish_driver!(push_all_tags(opts))
    }
}
