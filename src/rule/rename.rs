/// Direction-keyed renaming of call targets.
use crate::node::CallExpr;

/// Rename `call` according to `map`, a list of `(old, new)` pairs.
///
/// The first pair whose old name matches the call's target (ignoring ASCII
/// case, as PHP method names do) wins.  Calls matching no entry are left
/// alone.  Returns whether a rename happened.
pub fn rename_with_map(call: &mut CallExpr, map: &[(&str, &str)]) -> bool {
    let Some((_, new_name)) = map.iter().find(|(old, _)| call.is_name(old)) else {
        return false;
    };
    call.name = (*new_name).to_string();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::CallKind;

    const MAP: &[(&str, &str)] = &[
        ("assertTrue", "assertArrayHasKey"),
        ("assertFalse", "assertArrayNotHasKey"),
    ];

    #[test]
    fn test_renames_matching_direction() {
        let mut call = CallExpr::new(CallKind::Method, "assertFalse", vec![]);
        assert!(rename_with_map(&mut call, MAP));
        assert_eq!(call.name, "assertArrayNotHasKey");
    }

    #[test]
    fn test_rename_ignores_case() {
        let mut call = CallExpr::new(CallKind::StaticMethod, "ASSERTTRUE", vec![]);
        assert!(rename_with_map(&mut call, MAP));
        assert_eq!(call.name, "assertArrayHasKey");
    }

    #[test]
    fn test_unmatched_name_is_untouched() {
        let mut call = CallExpr::new(CallKind::Method, "assertSame", vec![]);
        assert!(!rename_with_map(&mut call, MAP));
        assert_eq!(call.name, "assertSame");
    }
}
