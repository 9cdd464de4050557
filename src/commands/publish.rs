use std::{fs::File, path::PathBuf};

use bon::Builder;
use clap::Args;
use log::{debug, info, trace};
use miette::{Context, Result};
use oci_distribution::Reference;

use crate::drivers::{
    opts::{LoadOpts, PushAllOpts, TagOpts},
    Driver, DriverArgs, PublishDriver,
};

use self::error::PublishError;

use super::PublisherCommand;

mod error;

#[derive(Debug, Args, Builder)]
pub struct PublishCommand {
    /// The image archive produced by the build step.
    #[arg()]
    #[builder(into)]
    archive: PathBuf,

    /// The repository name the archive was built under.
    #[arg()]
    #[builder(into)]
    repository: String,

    /// The tag the archive was built with.
    #[arg()]
    #[builder(into)]
    tag: String,

    /// Comma-separated list of destination image references
    /// to alias the loaded image with and push.
    #[arg()]
    #[builder(into)]
    tags: String,

    #[clap(flatten)]
    #[builder(default)]
    drivers: DriverArgs,
}

impl PublisherCommand for PublishCommand {
    fn try_run(&mut self) -> Result<()> {
        trace!("PublishCommand::try_run()");

        Driver::init(self.drivers);

        self.publish::<Driver>()
    }
}

impl PublishCommand {
    /// The whole publish flow: validate, load, alias every
    /// destination tag, then push the repository's tags once.
    ///
    /// Every step is fail-fast. Aliases applied before a failure
    /// are left in place, the error names the destination that
    /// failed so logs show how far tagging got.
    fn publish<D: PublishDriver>(&self) -> Result<()> {
        let plan = self.plan()?;

        info!("Loading {} as {}", plan.archive.display(), plan.base_image);
        D::load(
            &LoadOpts::builder()
                .archive(plan.archive.as_path())
                .image(&*plan.base_image)
                .build(),
        )
        .context("Failed to load the image archive")?;

        debug!("Tagging all images");
        for dest in &plan.destinations {
            debug!("Tagging {} with {dest}", plan.base_image);

            D::tag(
                &TagOpts::builder()
                    .src_image(&*plan.base_image)
                    .dest_image(dest.as_str())
                    .build(),
            )
            .with_context(|| {
                format!("Failed to tag {dest}, remaining tags were not applied or pushed")
            })?;
        }

        info!("Pushing all tags for {}", plan.repository);
        D::push_all_tags(&PushAllOpts::builder().repository(&*plan.repository).build())
            .with_context(|| format!("Failed to push tags for {}", plan.repository))?;

        info!(
            "Finished publishing {} under {} tag{}",
            plan.repository,
            plan.destinations.len(),
            if plan.destinations.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    /// Validates every input up front so that no runtime
    /// operation is ever attempted with bad arguments.
    fn plan(&self) -> Result<PublishPlan, PublishError> {
        trace!("PublishCommand::plan()");

        let repository = self.repository.trim();
        if repository.is_empty() {
            return Err(PublishError::EmptyArg { name: "REPOSITORY" });
        }

        let tag = self.tag.trim();
        if tag.is_empty() {
            return Err(PublishError::EmptyArg { name: "TAG" });
        }

        File::open(&self.archive).map_err(|source| PublishError::ArchiveUnreadable {
            path: self.archive.clone(),
            source,
        })?;

        let base_image = format!("{repository}:{tag}");
        parse_reference(&base_image)?;
        let destinations = parse_tag_list(&self.tags)?;

        Ok(PublishPlan {
            archive: self.archive.clone(),
            repository: repository.to_owned(),
            base_image,
            destinations,
        })
    }
}

/// The validated inputs of a publish run.
///
/// References are kept as the strings the caller wrote: each
/// destination is handed to the runtime client verbatim, never
/// re-normalized. Parsing is validation only.
#[derive(Debug)]
struct PublishPlan {
    archive: PathBuf,
    repository: String,
    base_image: String,
    destinations: Vec<String>,
}

/// Splits a comma-separated tag list into destination references.
///
/// Any empty segment rejects the whole list. An empty string is
/// not a tag that can be pushed, and silently skipping it would
/// hide a broken tag-generation step upstream.
fn parse_tag_list(tags: &str) -> Result<Vec<String>, PublishError> {
    if tags.trim().is_empty() {
        return Err(PublishError::NoTags);
    }

    tags.split(',')
        .map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return Err(PublishError::EmptyTagEntry);
            }
            parse_reference(entry)?;
            Ok(entry.to_owned())
        })
        .collect()
}

fn parse_reference(reference: &str) -> Result<Reference, PublishError> {
    reference
        .parse()
        .map_err(|source| PublishError::InvalidReference {
            reference: reference.to_owned(),
            source,
        })
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;

    use miette::bail;
    use rstest::rstest;

    use crate::string_vec;

    use super::*;

    const TEST_REPOSITORY: &str = "ghcr.io/test-owner/test-image";
    const TEST_TAG: &str = "0.1.0";

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum DriverOp {
        Load { archive: String, image: String },
        Tag { src: String, dest: String },
        PushAll { repository: String },
    }

    thread_local! {
        static OPS: RefCell<Vec<DriverOp>> = const { RefCell::new(Vec::new()) };
        static FAIL_TAG: RefCell<Option<String>> = const { RefCell::new(None) };
    }

    /// Records every driver call made on the current thread,
    /// optionally failing a chosen tag destination.
    struct RecordingDriver;

    impl PublishDriver for RecordingDriver {
        fn load(opts: &LoadOpts) -> Result<()> {
            OPS.with_borrow_mut(|ops| {
                ops.push(DriverOp::Load {
                    archive: opts.archive.display().to_string(),
                    image: opts.image.to_string(),
                });
            });
            Ok(())
        }

        fn tag(opts: &TagOpts) -> Result<()> {
            let dest = opts.dest_image.to_string();

            if FAIL_TAG.with_borrow(|fail| fail.as_deref() == Some(dest.as_str())) {
                bail!("Failed to tag image {dest}");
            }

            OPS.with_borrow_mut(|ops| {
                ops.push(DriverOp::Tag {
                    src: opts.src_image.to_string(),
                    dest,
                });
            });
            Ok(())
        }

        fn push_all_tags(opts: &PushAllOpts) -> Result<()> {
            OPS.with_borrow_mut(|ops| {
                ops.push(DriverOp::PushAll {
                    repository: opts.repository.to_string(),
                });
            });
            Ok(())
        }
    }

    fn recorded_ops() -> Vec<DriverOp> {
        OPS.with_borrow(Clone::clone)
    }

    fn fail_tagging_of(dest: &str) {
        FAIL_TAG.with_borrow_mut(|fail| *fail = Some(dest.to_string()));
    }

    fn archive_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-files/image-archive.tar")
    }

    fn command(tags: &str) -> PublishCommand {
        PublishCommand::builder()
            .archive(archive_path())
            .repository(TEST_REPOSITORY)
            .tag(TEST_TAG)
            .tags(tags)
            .build()
    }

    fn expected_success_ops(destinations: &[String]) -> Vec<DriverOp> {
        let mut ops = vec![DriverOp::Load {
            archive: archive_path().display().to_string(),
            image: format!("{TEST_REPOSITORY}:{TEST_TAG}"),
        }];
        ops.extend(destinations.iter().map(|dest| DriverOp::Tag {
            src: format!("{TEST_REPOSITORY}:{TEST_TAG}"),
            dest: dest.clone(),
        }));
        ops.push(DriverOp::PushAll {
            repository: TEST_REPOSITORY.to_string(),
        });
        ops
    }

    #[test]
    fn fans_out_every_destination_tag() {
        let destinations = string_vec![
            "ghcr.io/test-owner/test-image:latest",
            "ghcr.io/test-owner/test-image:0.1.0",
            "ghcr.io/test-owner/test-image:abc1234",
        ];

        command(&destinations.join(","))
            .publish::<RecordingDriver>()
            .unwrap();

        assert_eq!(recorded_ops(), expected_success_ops(&destinations));
    }

    #[test]
    fn passes_destination_tags_to_the_driver_verbatim() {
        // A bare name would re-render as docker.io/library/a:latest
        // if the parsed reference were handed over instead of the
        // caller's own string.
        command("a,b").publish::<RecordingDriver>().unwrap();

        assert_eq!(
            recorded_ops(),
            expected_success_ops(&string_vec!["a", "b"])
        );
    }

    #[test]
    fn pushes_once_after_all_tags() {
        command("ghcr.io/test-owner/test-image:latest,ghcr.io/test-owner/test-image:stable")
            .publish::<RecordingDriver>()
            .unwrap();

        let ops = recorded_ops();
        let pushes = ops
            .iter()
            .filter(|op| matches!(op, DriverOp::PushAll { .. }))
            .count();

        assert_eq!(pushes, 1);
        assert!(matches!(ops.last(), Some(DriverOp::PushAll { .. })));
    }

    #[test]
    fn aborts_tagging_and_push_on_first_failure() {
        fail_tagging_of("ghcr.io/test-owner/test-image:b");

        let result = command(
            "ghcr.io/test-owner/test-image:a,ghcr.io/test-owner/test-image:b,ghcr.io/test-owner/test-image:c",
        )
        .publish::<RecordingDriver>();

        assert!(result.is_err());
        assert_eq!(
            recorded_ops(),
            vec![
                DriverOp::Load {
                    archive: archive_path().display().to_string(),
                    image: format!("{TEST_REPOSITORY}:{TEST_TAG}"),
                },
                DriverOp::Tag {
                    src: format!("{TEST_REPOSITORY}:{TEST_TAG}"),
                    dest: "ghcr.io/test-owner/test-image:a".to_string(),
                },
            ]
        );
    }

    #[test]
    fn republishing_repeats_the_same_operations() {
        let tags = "ghcr.io/test-owner/test-image:latest";
        let mut expected = expected_success_ops(&string_vec![tags]);
        expected.extend(expected.clone());

        let command = command(tags);
        command.publish::<RecordingDriver>().unwrap();
        command.publish::<RecordingDriver>().unwrap();

        assert_eq!(recorded_ops(), expected);
    }

    #[rstest]
    #[case::empty_repository("", TEST_TAG, "ghcr.io/test-owner/test-image:latest")]
    #[case::blank_repository("  ", TEST_TAG, "ghcr.io/test-owner/test-image:latest")]
    #[case::empty_tag(TEST_REPOSITORY, "", "ghcr.io/test-owner/test-image:latest")]
    #[case::empty_tag_list(TEST_REPOSITORY, TEST_TAG, "")]
    #[case::empty_tag_entry(TEST_REPOSITORY, TEST_TAG, "a,,c")]
    #[case::trailing_comma(TEST_REPOSITORY, TEST_TAG, "a,c,")]
    #[case::invalid_reference(TEST_REPOSITORY, TEST_TAG, "NOT_A_REF!")]
    fn rejects_bad_input_before_any_runtime_operation(
        #[case] repository: &str,
        #[case] tag: &str,
        #[case] tags: &str,
    ) {
        let command = PublishCommand::builder()
            .archive(archive_path())
            .repository(repository)
            .tag(tag)
            .tags(tags)
            .build();

        let result = command.publish::<RecordingDriver>();

        assert!(result.is_err());
        assert!(recorded_ops().is_empty());
    }

    #[test]
    fn rejects_unreadable_archive_before_any_runtime_operation() {
        let command = PublishCommand::builder()
            .archive("does/not/exist.tar")
            .repository(TEST_REPOSITORY)
            .tag(TEST_TAG)
            .tags("ghcr.io/test-owner/test-image:latest")
            .build();

        let result = command.publish::<RecordingDriver>();

        assert!(result.is_err());
        assert!(recorded_ops().is_empty());
    }

    #[rstest]
    #[case::single("registry.example.com/app:latest", vec!["registry.example.com/app:latest"])]
    #[case::multiple("a,b,c", vec!["a", "b", "c"])]
    #[case::surrounding_whitespace(" a , b ", vec!["a", "b"])]
    fn splits_destination_tags_verbatim(#[case] tags: &str, #[case] expected: Vec<&str>) {
        assert_eq!(parse_tag_list(tags).unwrap(), expected);
    }

    #[rstest]
    #[case::middle_empty("a,,c")]
    #[case::leading_empty(",a")]
    #[case::only_commas(",,")]
    #[case::whitespace_entry("a, ,c")]
    fn rejects_empty_tag_segments(#[case] tags: &str) {
        assert!(matches!(
            parse_tag_list(tags),
            Err(PublishError::EmptyTagEntry)
        ));
    }

    #[test]
    fn rejects_empty_tag_list() {
        assert!(matches!(parse_tag_list("  "), Err(PublishError::NoTags)));
    }
}
