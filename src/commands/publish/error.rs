use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum PublishError {
    #[error("Argument <{name}> must not be empty")]
    #[diagnostic(
        code(publish::usage),
        help("usage: container-publish publish <ARCHIVE> <REPOSITORY> <TAG> <TAGS>")
    )]
    EmptyArg { name: &'static str },

    #[error("Image archive {} is not readable", .path.display())]
    #[diagnostic(
        code(publish::archive),
        help("the archive must be produced by the build step before publishing")
    )]
    ArchiveUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid image reference {reference:?}")]
    #[diagnostic(code(publish::tag))]
    InvalidReference {
        reference: String,
        #[source]
        source: oci_distribution::ParseError,
    },

    #[error("Destination tag list contains an empty entry")]
    #[diagnostic(
        code(publish::tag),
        help("tags are comma-separated and every entry must be a full image reference")
    )]
    EmptyTagEntry,

    #[error("Destination tag list must contain at least one tag")]
    #[diagnostic(code(publish::usage))]
    NoTags,
}
