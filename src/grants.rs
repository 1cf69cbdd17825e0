//! Matching requested identifiers against persisted grants.

use crate::convert::encoded_path;
use crate::types::{DocumentIdentifier, Grant};

/// Find the most specific grant covering a requested identifier.
///
/// A grant covers a request iff the authorities match and the grant root's
/// encoded id is a segment-wise prefix of the requested encoded id. Raw
/// string prefixing is never used: encodings without segment semantics
/// (`Other` providers, legacy root markers) cover only a byte-equal
/// identifier. When several grants cover, the longest matching prefix wins;
/// starting from the nearest root minimizes the downward navigation later
/// strategies may need.
///
/// No covering grant is a normal outcome, not an error.
pub fn find_covering<'a>(
    requested: &DocumentIdentifier,
    grants: &'a [Grant],
) -> Option<&'a Grant> {
    let requested_path = encoded_path(requested);

    let mut best: Option<(&Grant, usize)> = None;
    for grant in grants {
        let Some(depth) = covering_depth(requested, requested_path.as_ref(), grant) else {
            continue;
        };
        match best {
            Some((_, best_depth)) if best_depth >= depth => {}
            _ => best = Some((grant, depth)),
        }
    }
    best.map(|(grant, _)| grant)
}

/// Whether any persisted grant covers the identifier.
pub fn is_covered(requested: &DocumentIdentifier, grants: &[Grant]) -> bool {
    find_covering(requested, grants).is_some()
}

/// Segment depth at which a grant covers the request, or `None`.
fn covering_depth(
    requested: &DocumentIdentifier,
    requested_path: Option<&crate::convert::EncodedPath>,
    grant: &Grant,
) -> Option<usize> {
    if grant.root.authority != requested.authority {
        return None;
    }

    // Byte-equal ids cover regardless of encoding semantics.
    if grant.root.encoded_id == requested.encoded_id {
        return Some(usize::MAX);
    }

    let requested_path = requested_path?;
    let grant_path = encoded_path(&grant.root)?;

    if grant_path.anchor() != requested_path.anchor() {
        return None;
    }
    let depth = grant_path.segments().len();
    if depth >= requested_path.segments().len() {
        return None;
    }
    if requested_path.segments()[..depth] != *grant_path.segments() {
        return None;
    }
    Some(depth)
}
