//! The `#ref(id[, version])` command and its context-dependent meaning.

use peel_model::{EntityRef, Reference};

use crate::error::PeelError;
use crate::grammar::{EntityKind, GrammarEntry};
use crate::options::parse_version;
use crate::scanner::{
    classify, scan_content, skip_non_parsable, CharClass, DELIMITER, GROUP_OPEN,
};

/// Scan the body of a `#ref` command into its raw entries.
///
/// `pos` points at the command's `(`. Returns one or two entries and the
/// position after the closing `)`.
pub fn scan_reference(
    chars: &[char],
    pos: usize,
    keyword: &'static str,
) -> Result<(Vec<String>, usize), PeelError> {
    if chars.get(pos) != Some(&GROUP_OPEN) {
        return Err(PeelError::NotStarted {
            keyword,
            position: pos,
        });
    }

    let mut entries = Vec::new();
    let mut cur = pos + 1;
    loop {
        let Some(&c) = chars.get(cur) else {
            return Err(PeelError::NotCompleted {
                keyword,
                position: pos,
            });
        };
        match classify(c) {
            CharClass::GroupClose => {
                cur = skip_non_parsable(chars, cur + 1);
                break;
            }
            CharClass::Delimiter | CharClass::NonParsable | CharClass::GroupOpen => cur += 1,
            CharClass::CommandSigil => {
                return Err(PeelError::NestedInReference { position: cur });
            }
            CharClass::Content => {
                let (text, next) = scan_content(chars, cur, DELIMITER)?;
                entries.push(text);
                cur = next;
            }
        }
    }

    if entries.is_empty() || entries.len() > 2 {
        return Err(PeelError::ReferenceArity {
            actual: entries.len(),
            position: pos,
        });
    }
    Ok((entries, cur))
}

/// Build the reference a `#ref` means inside `parent`.
///
/// The same text is a variable reference inside a condition and a condition
/// reference inside a composite; only the parent decides.
pub fn resolve_reference(
    parent: &GrammarEntry,
    entries: Vec<String>,
) -> Result<Reference, PeelError> {
    let mut entries = entries.into_iter();
    let id = entries.next().unwrap_or_default();
    let version = entries.next().map(|v| parse_version(&v)).transpose()?;
    let target = EntityRef::new(id, version);

    let reference = match parent.kind {
        EntityKind::ConditionAtomic | EntityKind::PolicyAction => Reference::Variable(target),
        EntityKind::VariableDynamic => Reference::Resolver(target),
        EntityKind::ConditionComposite | EntityKind::Policy | EntityKind::Constraint => {
            Reference::Condition(target)
        }
        EntityKind::PolicySet | EntityKind::PolicyRelationship => Reference::Policy(target),
        EntityKind::ActionRelationship => Reference::Action(target),
        EntityKind::VariableStatic
        | EntityKind::ValueResolver
        | EntityKind::ConditionDefault
        | EntityKind::PolicyDefault
        | EntityKind::Reference
        | EntityKind::Options => {
            return Err(PeelError::UnsupportedReference {
                keyword: parent.keyword,
            })
        }
    };
    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{lookup, Command};
    use peel_model::Version;

    fn scan(s: &str) -> Result<(Vec<String>, usize), PeelError> {
        let chars: Vec<char> = s.chars().collect();
        scan_reference(&chars, 0, "#ref")
    }

    fn entry(c: Command) -> &'static GrammarEntry {
        lookup(c).unwrap()
    }

    #[test]
    fn scans_id_and_version() {
        let (entries, pos) = scan("( cond-1 , 1.0.0 )  ,").unwrap();
        assert_eq!(entries, vec!["cond-1", "1.0.0"]);
        assert_eq!(pos, 20);
    }

    #[test]
    fn entry_count_is_checked() {
        assert!(matches!(
            scan("()").unwrap_err(),
            PeelError::ReferenceArity { actual: 0, .. }
        ));
        assert!(matches!(
            scan("(a,1.0.0,x)").unwrap_err(),
            PeelError::ReferenceArity { actual: 3, .. }
        ));
    }

    #[test]
    fn nested_commands_are_rejected() {
        assert!(matches!(
            scan("(#str(a))").unwrap_err(),
            PeelError::NestedInReference { position: 1 }
        ));
    }

    #[test]
    fn parent_kind_decides_the_reference_kind() {
        let entries = || vec!["x".to_string()];
        let cases = [
            (Command::GreaterThan, "variable reference"),
            (Command::Save, "variable reference"),
            (Command::Dynamic, "resolver reference"),
            (Command::All, "condition reference"),
            (Command::Permit, "condition reference"),
            (Command::Constraint, "condition reference"),
            (Command::DenyOverrides, "policy reference"),
            (Command::Pol, "policy reference"),
            (Command::Act, "action reference"),
        ];
        for (parent, expected) in cases {
            let r = resolve_reference(entry(parent), entries()).unwrap();
            assert_eq!(r.kind_name(), expected, "{:?}", parent);
            assert_eq!(r.target().id, "x");
        }
    }

    #[test]
    fn version_is_parsed() {
        let r = resolve_reference(
            entry(Command::All),
            vec!["c".to_string(), "2.1.0".to_string()],
        )
        .unwrap();
        assert_eq!(r.target().version, Some(Version::new(2, 1, 0)));

        let err = resolve_reference(entry(Command::All), vec!["c".into(), "2.x".into()])
            .unwrap_err();
        assert!(matches!(err, PeelError::InvalidVersion { .. }));
    }

    #[test]
    fn references_in_leaf_commands_are_rejected() {
        let err = resolve_reference(entry(Command::Str), vec!["x".into()]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "references are not supported inside command '#str'"
        );
    }
}
