//! Compatibility scoring between a viewer and a discovery candidate.
//!
//! The score only ranks the feed; it never decides whether a like is allowed.

use std::collections::BTreeSet;

use crate::constants::{
    SCORE_FUN_CAP, SCORE_FUN_PER_TAG, SCORE_MAX, SCORE_MEDIA_CAP, SCORE_MEDIA_PER_TAG,
    SCORE_SAME_BASE, SCORE_SAME_LOOKING_FOR, SCORE_VALUES_CAP, SCORE_VALUES_PER_TAG,
};
use crate::profile::Profile;

/// Score two profiles' shared attributes, in `0..=100`.
///
/// Scores 0 unless both profiles have all three of `basics`, `life` and
/// `relationships`. Location and looking-for only score when both sides
/// actually state one.
pub fn compatibility(viewer: &Profile, candidate: &Profile) -> u32 {
    if !has_scored_groups(viewer) || !has_scored_groups(candidate) {
        return 0;
    }

    let mut score = 0;

    score += overlap_points(viewer.fun(), candidate.fun(), SCORE_FUN_PER_TAG, SCORE_FUN_CAP);
    score += overlap_points(
        viewer.media(),
        candidate.media(),
        SCORE_MEDIA_PER_TAG,
        SCORE_MEDIA_CAP,
    );
    score += overlap_points(
        viewer.values(),
        candidate.values(),
        SCORE_VALUES_PER_TAG,
        SCORE_VALUES_CAP,
    );

    if both_equal(viewer.based(), candidate.based()) {
        score += SCORE_SAME_BASE;
    }
    if both_equal(viewer.looking_for(), candidate.looking_for()) {
        score += SCORE_SAME_LOOKING_FOR;
    }

    score.min(SCORE_MAX)
}

fn has_scored_groups(p: &Profile) -> bool {
    p.basics.is_some() && p.life.is_some() && p.relationships.is_some()
}

fn overlap_points(
    a: Option<&BTreeSet<String>>,
    b: Option<&BTreeSet<String>>,
    per_tag: u32,
    cap: u32,
) -> u32 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0;
    };
    let shared = a.intersection(b).count() as u32;
    shared.saturating_mul(per_tag).min(cap)
}

fn both_equal(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}
