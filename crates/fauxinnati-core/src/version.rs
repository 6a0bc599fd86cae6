//! Version derivations and the synthetic release identifiers attached to nodes.
//!
//! Every helper returns a fresh [`Version`]; inputs are never mutated. The
//! increment and decrement helpers are checked and return `None` when a
//! component would leave the `u64` range.

use semver::{Prerelease, Version};

const RELEASE_IMAGE_REPOSITORY: &str = "quay.io/openshift-release-dev/ocp-release";
const ERRATA_URL_PREFIX: &str = "https://access.redhat.com/errata/RHSA-2024:";

/// Next minor release with the patch reset to zero.
pub fn next_minor(version: &Version) -> Option<Version> {
    let mut next = version.clone();
    next.minor = version.minor.checked_add(1)?;
    next.patch = 0;
    Some(next)
}

/// Next patch release of the same minor.
pub fn next_patch(version: &Version) -> Option<Version> {
    let mut next = version.clone();
    next.patch = version.patch.checked_add(1)?;
    Some(next)
}

/// Previous minor release with the patch reset to zero. `None` for minor 0.
pub fn prev_minor(version: &Version) -> Option<Version> {
    let mut prev = version.clone();
    prev.minor = version.minor.checked_sub(1)?;
    prev.patch = 0;
    Some(prev)
}

pub fn with_patch(version: &Version, patch: u64) -> Version {
    let mut pinned = version.clone();
    pinned.patch = patch;
    pinned
}

/// Same version with the pre-release identifier cleared. Build metadata is kept.
pub fn release_of(version: &Version) -> Version {
    let mut release = version.clone();
    release.pre = Prerelease::EMPTY;
    release
}

fn release_serial(version: &Version) -> u64 {
    version
        .major
        .wrapping_mul(1_000_000)
        .wrapping_add(version.minor.wrapping_mul(1_000))
        .wrapping_add(version.patch)
}

/// 64 hex digit digest standing in for the release payload digest.
pub fn image_digest(version: &Version) -> String {
    format!("{:064x}", release_serial(version))
}

pub fn release_image(version: &Version) -> String {
    format!("{}@sha256:{}", RELEASE_IMAGE_REPOSITORY, image_digest(version))
}

pub fn manifest_ref(version: &Version) -> String {
    format!("sha256:{}", image_digest(version))
}

pub fn errata_url(version: &Version) -> String {
    let advisory = version
        .major
        .wrapping_mul(1_000)
        .wrapping_add(version.minor.wrapping_mul(100))
        .wrapping_add(version.patch);
    format!("{}{:05}", ERRATA_URL_PREFIX, advisory)
}
