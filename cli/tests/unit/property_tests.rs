//! Property tests for batch descriptor construction over the public API.

use ltm_handoff::domain::batch::{self, PinnedSource};
use ltm_handoff::domain::{Architecture, PublishedArtifactRef};
use proptest::prelude::*;

fn arch_subset() -> impl Strategy<Value = Vec<Architecture>> {
    proptest::sample::subsequence(Architecture::ALL.to_vec(), 0..=Architecture::ALL.len())
}

proptest! {
    /// Job count is one pinned job per architecture plus one custom job per
    /// published kernel, and every line is newline-terminated.
    #[test]
    fn job_count_matches_inputs(archs in arch_subset(), published in arch_subset()) {
        let refs: Vec<PublishedArtifactRef> = published
            .iter()
            .map(|&arch| PublishedArtifactRef::under("gs://ltm-bucket", arch))
            .collect();
        let pinned = PinnedSource { repo: "https://example.org/linux.git", commit: "v6.12" };

        let descriptor = batch::build(&archs, &refs, pinned);

        let customs = published.iter().filter(|a| archs.contains(a)).count();
        prop_assert_eq!(descriptor.len(), archs.len() + customs);
        prop_assert_eq!(descriptor.render().lines().count(), descriptor.len());
        if !descriptor.is_empty() {
            prop_assert!(descriptor.render().ends_with('\n'));
        }
    }

    /// Every custom-kernel line names an object under the bucket root.
    #[test]
    fn custom_lines_reference_bucket_objects(published in arch_subset()) {
        let refs: Vec<PublishedArtifactRef> = published
            .iter()
            .map(|&arch| PublishedArtifactRef::under("gs://ltm-bucket/", arch))
            .collect();
        let pinned = PinnedSource { repo: "r", commit: "c" };

        let descriptor = batch::build(&Architecture::ALL, &refs, pinned);

        for job in descriptor.iter().filter(|j| !j.is_pinned_source()) {
            let line = job.to_string();
            let expected = format!("--kernel gs://ltm-bucket/kernel-{}.deb", job.architecture);
            prop_assert!(line.ends_with(&expected), "{}", line);
        }
    }
}
