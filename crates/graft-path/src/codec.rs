//! Parsing and formatting of leaf paths.
//!
//! Grammar: `Segment ("." Segment)*` where a segment is a member name, a
//! member name with a bracket index, or a bare bracket index. Bare-index
//! segments attach directly to the previous segment without a dot, so a
//! nested sequence element reads `rows[1][2]` and parses as the member
//! `rows` at index 1, then index 2.

use serde::{Deserialize, Serialize};

use crate::error::{PathError, PathResult};

/// One step of a parsed path: a member name, an index, or both.
///
/// `member` and `index` are never both `None` in parser output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    /// The member name, if this step addresses an object member.
    pub member: Option<String>,
    /// The sequence index, if this step addresses a sequence element.
    pub index: Option<usize>,
}

impl PathSegment {
    /// A member-name step (`name`).
    pub fn member(name: impl Into<String>) -> Self {
        Self {
            member: Some(name.into()),
            index: None,
        }
    }

    /// A member-plus-index step (`name[i]`).
    pub fn indexed(name: impl Into<String>, index: usize) -> Self {
        Self {
            member: Some(name.into()),
            index: Some(index),
        }
    }

    /// A bare-index step (`[i]`).
    pub fn index(index: usize) -> Self {
        Self {
            member: None,
            index: Some(index),
        }
    }
}

/// Parse a path string into its segments.
pub fn parse_path(path: &str) -> PathResult<Vec<PathSegment>> {
    if path.is_empty() {
        return Err(PathError::Empty);
    }

    let mut segments = Vec::new();
    let mut chars = path.char_indices().peekable();

    loop {
        match chars.peek().copied() {
            Some((_, '[')) => {
                let index = parse_bracket(path, &mut chars)?;
                segments.push(PathSegment::index(index));
            }
            Some((position, ch)) if ch == '.' || ch == ']' => {
                return Err(PathError::UnexpectedChar {
                    path: path.to_string(),
                    ch,
                    position,
                });
            }
            Some((position, _)) => {
                let name = take_member_name(&mut chars);
                if name.is_empty() {
                    return Err(PathError::EmptyMember {
                        path: path.to_string(),
                        position,
                    });
                }
                let mut segment = PathSegment::member(name);
                if matches!(chars.peek(), Some((_, '['))) {
                    segment.index = Some(parse_bracket(path, &mut chars)?);
                }
                segments.push(segment);
            }
            None => {
                // Only reachable after a trailing dot.
                return Err(PathError::EmptyMember {
                    path: path.to_string(),
                    position: path.len(),
                });
            }
        }

        match chars.peek().copied() {
            None => break,
            Some((_, '.')) => {
                chars.next();
            }
            // A bare-index segment follows without a separator.
            Some((_, '[')) => {}
            Some((position, ch)) => {
                return Err(PathError::UnexpectedChar {
                    path: path.to_string(),
                    ch,
                    position,
                });
            }
        }
    }

    Ok(segments)
}

fn take_member_name(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> String {
    let mut name = String::new();
    while let Some((_, ch)) = chars.peek().copied() {
        if ch == '.' || ch == '[' || ch == ']' {
            break;
        }
        name.push(ch);
        chars.next();
    }
    name
}

fn parse_bracket(
    path: &str,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> PathResult<usize> {
    // Caller has peeked the '['.
    chars.next();

    let mut digits = String::new();
    loop {
        match chars.next() {
            Some((_, ']')) => break,
            Some((_, ch)) => digits.push(ch),
            None => {
                return Err(PathError::UnterminatedBracket {
                    path: path.to_string(),
                });
            }
        }
    }

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PathError::InvalidIndex {
            path: path.to_string(),
            index: digits,
        });
    }

    digits.parse::<usize>().map_err(|_| PathError::InvalidIndex {
        path: path.to_string(),
        index: digits,
    })
}

/// Format segments back into a path string.
///
/// Inverse of [`parse_path`] for parser output: member steps are joined with
/// dots, bare-index steps attach directly to their predecessor.
pub fn format_path(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        match (&segment.member, segment.index) {
            (Some(name), index) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(name);
                if let Some(i) = index {
                    out.push_str(&format!("[{i}]"));
                }
            }
            (None, Some(i)) => {
                out.push_str(&format!("[{i}]"));
            }
            (None, None) => {}
        }
    }
    out
}

/// Returns `true` if one path is a structural ancestor of the other.
///
/// That is the case when one path string is a proper prefix of the other and
/// the character immediately following the shorter one is `.` or `[`, so
/// `a.b` and `a.b[2].c` are same-branch while `a.b` and `a.bc` are not.
/// Equal paths are trivially same-branch.
pub fn same_branch(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (short, long) = if a.len() < b.len() { (a, b) } else { (b, a) };
    long.starts_with(short) && matches!(long.as_bytes()[short.len()], b'.' | b'[')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_member() {
        assert_eq!(parse_path("name").unwrap(), vec![PathSegment::member("name")]);
    }

    #[test]
    fn dotted_members() {
        assert_eq!(
            parse_path("engine.block.bore").unwrap(),
            vec![
                PathSegment::member("engine"),
                PathSegment::member("block"),
                PathSegment::member("bore"),
            ]
        );
    }

    #[test]
    fn member_with_index() {
        assert_eq!(
            parse_path("cylinders[2]").unwrap(),
            vec![PathSegment::indexed("cylinders", 2)]
        );
    }

    #[test]
    fn nested_indices_attach_without_dot() {
        assert_eq!(
            parse_path("rows[1][2]").unwrap(),
            vec![PathSegment::indexed("rows", 1), PathSegment::index(2)]
        );
    }

    #[test]
    fn index_then_member() {
        assert_eq!(
            parse_path("rows[0].label").unwrap(),
            vec![PathSegment::indexed("rows", 0), PathSegment::member("label")]
        );
    }

    #[test]
    fn bare_index_root() {
        assert_eq!(parse_path("[3]").unwrap(), vec![PathSegment::index(3)]);
    }

    #[test]
    fn reject_empty_path() {
        assert_eq!(parse_path(""), Err(PathError::Empty));
    }

    #[test]
    fn reject_trailing_dot() {
        assert!(matches!(
            parse_path("a.b."),
            Err(PathError::EmptyMember { .. })
        ));
    }

    #[test]
    fn reject_double_dot() {
        assert!(matches!(
            parse_path("a..b"),
            Err(PathError::UnexpectedChar { ch: '.', .. })
        ));
    }

    #[test]
    fn reject_unterminated_bracket() {
        assert!(matches!(
            parse_path("a[12"),
            Err(PathError::UnterminatedBracket { .. })
        ));
    }

    #[test]
    fn reject_non_numeric_index() {
        assert!(matches!(
            parse_path("a[x]"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            parse_path("a[]"),
            Err(PathError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn reject_stray_close_bracket() {
        assert!(matches!(
            parse_path("a]b"),
            Err(PathError::UnexpectedChar { ch: ']', .. })
        ));
    }

    #[test]
    fn format_joins_with_dots_and_brackets() {
        let segments = vec![
            PathSegment::member("engine"),
            PathSegment::indexed("cylinders", 2),
            PathSegment::index(1),
            PathSegment::member("bore"),
        ];
        assert_eq!(format_path(&segments), "engine.cylinders[2][1].bore");
    }

    #[test]
    fn same_branch_prefix_with_dot() {
        assert!(same_branch("a.b", "a.b.c"));
        assert!(same_branch("a.b.c", "a.b"));
    }

    #[test]
    fn same_branch_prefix_with_bracket() {
        assert!(same_branch("rows", "rows[0].label"));
    }

    #[test]
    fn same_branch_rejects_name_prefix() {
        assert!(!same_branch("a.b", "a.bc"));
        assert!(!same_branch("row", "rows[0]"));
    }

    #[test]
    fn same_branch_rejects_siblings() {
        assert!(!same_branch("a.b", "a.c"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn segment() -> impl Strategy<Value = PathSegment> {
            let name = "[a-z_][a-z0-9_]{0,8}";
            prop_oneof![
                name.prop_map(PathSegment::member),
                (name, 0usize..1000).prop_map(|(n, i)| PathSegment::indexed(n, i)),
                (0usize..1000).prop_map(PathSegment::index),
            ]
        }

        /// The formatter glues `name` + `[i]` into one `name[i]` segment, so
        /// a member-only step followed by a bare index parses back as a
        /// single indexed step. Canonicalize the expectation the same way.
        fn canonicalize(segments: Vec<PathSegment>) -> Vec<PathSegment> {
            let mut out: Vec<PathSegment> = Vec::new();
            for seg in segments {
                if let (None, Some(i)) = (&seg.member, seg.index) {
                    if let Some(prev) = out.last_mut() {
                        if prev.member.is_some() && prev.index.is_none() {
                            prev.index = Some(i);
                            continue;
                        }
                    }
                }
                out.push(seg);
            }
            out
        }

        proptest! {
            #[test]
            fn format_then_parse_roundtrips(
                segments in prop::collection::vec(segment(), 1..8)
            ) {
                let expected = canonicalize(segments);
                let formatted = format_path(&expected);
                let parsed = parse_path(&formatted).unwrap();
                prop_assert_eq!(parsed, expected);
            }
        }
    }
}
