use std::{borrow::Cow, path::Path};

use bon::Builder;

/// Options for loading an image archive
/// into the local image store.
#[derive(Debug, Clone, Builder)]
pub struct LoadOpts<'scope> {
    /// The archive file produced by the build step.
    #[builder(into)]
    pub archive: Cow<'scope, Path>,

    /// The reference the archive was built under.
    #[builder(into)]
    pub image: Cow<'scope, str>,
}

/// Options for aliasing an image.
///
/// Both references are handed to the runtime client exactly
/// as written, never re-normalized.
#[derive(Debug, Clone, Builder)]
pub struct TagOpts<'scope> {
    #[builder(into)]
    pub src_image: Cow<'scope, str>,

    #[builder(into)]
    pub dest_image: Cow<'scope, str>,
}

#[derive(Debug, Clone, Builder)]
pub struct PushAllOpts<'scope> {
    /// The repository whose local tags should all be pushed.
    #[builder(into)]
    pub repository: Cow<'scope, str>,
}
