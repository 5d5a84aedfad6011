//! The PEEL command grammar: a fixed table of keywords, the entity kind
//! each one produces, which child kinds it accepts and how many arguments
//! it takes.

use std::fmt;

use crate::error::PeelError;
use crate::scanner::{classify, skip_non_parsable, CharClass, GROUP_OPEN};

/// What a command produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    VariableStatic,
    VariableDynamic,
    ValueResolver,
    ConditionAtomic,
    ConditionComposite,
    ConditionDefault,
    Policy,
    PolicySet,
    PolicyDefault,
    PolicyAction,
    Reference,
    Options,
    Constraint,
    ActionRelationship,
    PolicyRelationship,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::VariableStatic => "static variable",
            EntityKind::VariableDynamic => "dynamic variable",
            EntityKind::ValueResolver => "value resolver",
            EntityKind::ConditionAtomic => "atomic condition",
            EntityKind::ConditionComposite => "composite condition",
            EntityKind::ConditionDefault => "default condition",
            EntityKind::Policy => "policy",
            EntityKind::PolicySet => "policy set",
            EntityKind::PolicyDefault => "default policy",
            EntityKind::PolicyAction => "policy action",
            EntityKind::Reference => "reference",
            EntityKind::Options => "options",
            EntityKind::Constraint => "constraint",
            EntityKind::ActionRelationship => "action relationship",
            EntityKind::PolicyRelationship => "policy relationship",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every keyword the grammar knows. Deserializers match on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    // static variables
    Str,
    Date,
    DateTime,
    Time,
    Period,
    Duration,
    Int,
    Long,
    Number,
    Float,
    BigDecimal,
    Bool,
    Object,
    Array,
    // resolvers and dynamic variables
    JsonPath,
    Jq,
    Key,
    Dynamic,
    // atomic conditions
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    IsNull,
    NotNull,
    IsEmpty,
    NotEmpty,
    IsBlank,
    NotBlank,
    StartsWith,
    EndsWith,
    Contains,
    IsIn,
    Equals,
    Positive,
    Negative,
    Zero,
    Past,
    Future,
    Regexp,
    HasKey,
    Unique,
    Schema,
    // composite conditions
    Any,
    All,
    Not,
    NOf,
    // default conditions
    True,
    False,
    Null,
    // policies
    Permit,
    Deny,
    DefaultPermit,
    DefaultDeny,
    NotApplicable,
    IndeterminateDenyPermit,
    IndeterminateDeny,
    IndeterminatePermit,
    DenyOverrides,
    PermitOverrides,
    DenyUnlessPermit,
    PermitUnlessDeny,
    FirstApplicable,
    OnlyOneApplicable,
    // actions
    Save,
    Clear,
    Patch,
    Merge,
    // wrappers
    Act,
    Pol,
    Constraint,
    Ref,
    Opts,
}

/// One row of the grammar table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarEntry {
    pub command: Command,
    pub keyword: &'static str,
    pub kind: EntityKind,
    pub children: &'static [EntityKind],
    pub min_args: usize,
    /// `None` means unbounded.
    pub max_args: Option<usize>,
}

impl GrammarEntry {
    pub fn accepts_child(&self, kind: EntityKind) -> bool {
        self.children.contains(&kind)
    }

    pub(crate) fn children_list(&self) -> String {
        self.children
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

const fn entry(
    command: Command,
    keyword: &'static str,
    kind: EntityKind,
    children: &'static [EntityKind],
    min_args: usize,
    max_args: Option<usize>,
) -> GrammarEntry {
    GrammarEntry {
        command,
        keyword,
        kind,
        children,
        min_args,
        max_args,
    }
}

use EntityKind as K;

const NONE: &[EntityKind] = &[];
const VARIABLES: &[EntityKind] = &[K::VariableStatic, K::VariableDynamic, K::Reference];
const RESOLVERS: &[EntityKind] = &[K::ValueResolver, K::Reference];
const CONDITIONS: &[EntityKind] = &[
    K::ConditionAtomic,
    K::ConditionComposite,
    K::ConditionDefault,
    K::Reference,
];
const POLICY_CHILDREN: &[EntityKind] = &[
    K::ConditionAtomic,
    K::ConditionComposite,
    K::ConditionDefault,
    K::ActionRelationship,
    K::Reference,
];
const POLICY_SET_CHILDREN: &[EntityKind] = &[
    K::Policy,
    K::PolicySet,
    K::PolicyDefault,
    K::PolicyRelationship,
    K::ActionRelationship,
    K::Reference,
];
const POLICIES: &[EntityKind] = &[K::Policy, K::PolicySet, K::PolicyDefault, K::Reference];
const ACTIONS: &[EntityKind] = &[K::PolicyAction, K::Reference];

/// The grammar table. Keywords are matched case-sensitively.
pub static REGISTRY: &[GrammarEntry] = &[
    entry(Command::Str, "#str", K::VariableStatic, NONE, 1, Some(1)),
    entry(Command::Date, "#date", K::VariableStatic, NONE, 1, Some(1)),
    entry(Command::DateTime, "#dTime", K::VariableStatic, NONE, 1, Some(1)),
    entry(Command::Time, "#time", K::VariableStatic, NONE, 1, Some(1)),
    entry(Command::Period, "#per", K::VariableStatic, NONE, 1, Some(1)),
    entry(Command::Duration, "#dur", K::VariableStatic, NONE, 1, Some(1)),
    entry(Command::Int, "#int", K::VariableStatic, NONE, 1, Some(1)),
    entry(Command::Long, "#long", K::VariableStatic, NONE, 1, Some(1)),
    entry(Command::Number, "#num", K::VariableStatic, NONE, 1, Some(1)),
    entry(Command::Float, "#float", K::VariableStatic, NONE, 1, Some(1)),
    entry(Command::BigDecimal, "#bigD", K::VariableStatic, NONE, 1, Some(1)),
    entry(Command::Bool, "#bool", K::VariableStatic, NONE, 1, Some(1)),
    entry(Command::Object, "#obj", K::VariableStatic, NONE, 1, Some(1)),
    entry(Command::Array, "#arr", K::VariableStatic, NONE, 1, Some(1)),
    entry(Command::JsonPath, "*path", K::ValueResolver, NONE, 1, Some(1)),
    entry(Command::Jq, "*jq", K::ValueResolver, NONE, 1, Some(1)),
    entry(Command::Key, "*key", K::ValueResolver, NONE, 1, Some(1)),
    entry(Command::Dynamic, "*dyn", K::VariableDynamic, RESOLVERS, 1, None),
    entry(Command::GreaterThan, "*gt", K::ConditionAtomic, VARIABLES, 2, Some(2)),
    entry(Command::GreaterThanEqual, "*gte", K::ConditionAtomic, VARIABLES, 2, Some(2)),
    entry(Command::LessThan, "*lt", K::ConditionAtomic, VARIABLES, 2, Some(2)),
    entry(Command::LessThanEqual, "*lte", K::ConditionAtomic, VARIABLES, 2, Some(2)),
    entry(Command::IsNull, "*isNull", K::ConditionAtomic, VARIABLES, 1, Some(1)),
    entry(Command::NotNull, "*notNull", K::ConditionAtomic, VARIABLES, 1, Some(1)),
    entry(Command::IsEmpty, "*isEmpty", K::ConditionAtomic, VARIABLES, 1, Some(1)),
    entry(Command::NotEmpty, "*notEmpty", K::ConditionAtomic, VARIABLES, 1, Some(1)),
    entry(Command::IsBlank, "*isBlank", K::ConditionAtomic, VARIABLES, 1, Some(1)),
    entry(Command::NotBlank, "*notBlank", K::ConditionAtomic, VARIABLES, 1, Some(1)),
    entry(Command::StartsWith, "*sw", K::ConditionAtomic, VARIABLES, 2, Some(2)),
    entry(Command::EndsWith, "*ew", K::ConditionAtomic, VARIABLES, 2, Some(2)),
    entry(Command::Contains, "*contains", K::ConditionAtomic, VARIABLES, 2, Some(2)),
    entry(Command::IsIn, "*isIn", K::ConditionAtomic, VARIABLES, 2, Some(2)),
    entry(Command::Equals, "*eq", K::ConditionAtomic, VARIABLES, 2, Some(2)),
    entry(Command::Positive, "*pos", K::ConditionAtomic, VARIABLES, 1, Some(1)),
    entry(Command::Negative, "*neg", K::ConditionAtomic, VARIABLES, 1, Some(1)),
    entry(Command::Zero, "*zero", K::ConditionAtomic, VARIABLES, 1, Some(1)),
    entry(Command::Past, "*past", K::ConditionAtomic, VARIABLES, 1, Some(1)),
    entry(Command::Future, "*future", K::ConditionAtomic, VARIABLES, 1, Some(1)),
    entry(Command::Regexp, "*regexp", K::ConditionAtomic, VARIABLES, 2, Some(2)),
    entry(Command::HasKey, "*hasKey", K::ConditionAtomic, VARIABLES, 2, Some(2)),
    entry(Command::Unique, "*unique", K::ConditionAtomic, VARIABLES, 1, Some(1)),
    entry(Command::Schema, "*schema", K::ConditionAtomic, VARIABLES, 2, Some(2)),
    entry(Command::Any, "*any", K::ConditionComposite, CONDITIONS, 1, None),
    entry(Command::All, "*all", K::ConditionComposite, CONDITIONS, 1, None),
    entry(Command::Not, "*not", K::ConditionComposite, CONDITIONS, 1, Some(1)),
    entry(Command::NOf, "*nOf", K::ConditionComposite, CONDITIONS, 1, None),
    entry(Command::True, "#true", K::ConditionDefault, NONE, 0, Some(0)),
    entry(Command::False, "#false", K::ConditionDefault, NONE, 0, Some(0)),
    entry(Command::Null, "#null", K::ConditionDefault, NONE, 0, Some(0)),
    entry(Command::Permit, "*permit", K::Policy, POLICY_CHILDREN, 1, None),
    entry(Command::Deny, "*deny", K::Policy, POLICY_CHILDREN, 1, None),
    entry(Command::DefaultPermit, "#permit", K::PolicyDefault, NONE, 0, Some(0)),
    entry(Command::DefaultDeny, "#deny", K::PolicyDefault, NONE, 0, Some(0)),
    entry(Command::NotApplicable, "#NA", K::PolicyDefault, NONE, 0, Some(0)),
    entry(Command::IndeterminateDenyPermit, "#indDP", K::PolicyDefault, NONE, 0, Some(0)),
    entry(Command::IndeterminateDeny, "#indD", K::PolicyDefault, NONE, 0, Some(0)),
    entry(Command::IndeterminatePermit, "#indP", K::PolicyDefault, NONE, 0, Some(0)),
    entry(Command::DenyOverrides, "*DOverrides", K::PolicySet, POLICY_SET_CHILDREN, 1, None),
    entry(Command::PermitOverrides, "*POverrides", K::PolicySet, POLICY_SET_CHILDREN, 1, None),
    entry(Command::DenyUnlessPermit, "*DUnlessP", K::PolicySet, POLICY_SET_CHILDREN, 1, None),
    entry(Command::PermitUnlessDeny, "*PUnlessD", K::PolicySet, POLICY_SET_CHILDREN, 1, None),
    entry(Command::FirstApplicable, "*firstAppl", K::PolicySet, POLICY_SET_CHILDREN, 1, None),
    entry(Command::OnlyOneApplicable, "*onlyOneAppl", K::PolicySet, POLICY_SET_CHILDREN, 1, None),
    entry(Command::Save, "*save", K::PolicyAction, VARIABLES, 2, Some(2)),
    entry(Command::Clear, "*clear", K::PolicyAction, NONE, 1, Some(1)),
    entry(Command::Patch, "*patch", K::PolicyAction, VARIABLES, 3, Some(3)),
    entry(Command::Merge, "*merge", K::PolicyAction, VARIABLES, 3, Some(3)),
    entry(Command::Act, "*act", K::ActionRelationship, ACTIONS, 1, Some(1)),
    entry(Command::Pol, "*pol", K::PolicyRelationship, POLICIES, 1, Some(1)),
    entry(Command::Constraint, "*constraint", K::Constraint, CONDITIONS, 1, Some(1)),
    entry(Command::Ref, "#ref", K::Reference, NONE, 1, Some(2)),
    entry(Command::Opts, "#opts", K::Options, NONE, 0, None),
];

/// Look up the grammar row for a command.
pub fn lookup(command: Command) -> Option<&'static GrammarEntry> {
    REGISTRY.iter().find(|e| e.command == command)
}

/// Length of the longest keyword; bounds the candidate window.
pub fn max_keyword_len() -> usize {
    REGISTRY.iter().map(|e| e.keyword.len()).max().unwrap_or(0)
}

fn min_keyword_len() -> usize {
    REGISTRY.iter().map(|e| e.keyword.len()).min().unwrap_or(0)
}

/// Identify the command starting at `pos`.
///
/// Returns the grammar row and the position of the command's `(`.
pub fn resolve_command_name(
    chars: &[char],
    pos: usize,
) -> Result<(&'static GrammarEntry, usize), PeelError> {
    if pos >= chars.len() || chars.len() - pos < min_keyword_len() {
        return Err(PeelError::InputTooShort { position: pos });
    }

    let window_end = (pos + max_keyword_len()).min(chars.len());
    let window = &chars[pos..window_end];
    let cut = window
        .iter()
        .position(|&c| c == GROUP_OPEN)
        .unwrap_or(window.len());
    let candidate: String = window[..cut].iter().collect();
    let candidate = candidate
        .trim_end_matches(|c| classify(c) == CharClass::NonParsable)
        .to_string();

    // `*not` must not match `*notNull(`: compare with the group-open attached.
    let probe = format!("{}{}", candidate, GROUP_OPEN);
    let matches: Vec<&'static GrammarEntry> = REGISTRY
        .iter()
        .filter(|e| candidate.starts_with(e.keyword))
        .filter(|e| probe.starts_with(&format!("{}{}", e.keyword, GROUP_OPEN)))
        .collect();

    let found = match matches.as_slice() {
        [] => {
            return Err(PeelError::UnknownCommand {
                candidate,
                position: pos,
            })
        }
        [one] => *one,
        many => {
            return Err(PeelError::AmbiguousCommand {
                matches: many
                    .iter()
                    .map(|e| e.keyword)
                    .collect::<Vec<_>>()
                    .join(", "),
                candidate,
                position: pos,
            })
        }
    };

    let open = skip_non_parsable(chars, pos + found.keyword.chars().count());
    if open >= chars.len() || chars[open] != GROUP_OPEN {
        return Err(PeelError::MissingGroupOpen {
            keyword: found.keyword,
            position: pos,
        });
    }

    tracing::trace!(keyword = found.keyword, kind = %found.kind, position = pos, "resolved command");
    Ok((found, open))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(s: &str) -> Result<(&'static GrammarEntry, usize), PeelError> {
        let chars: Vec<char> = s.chars().collect();
        resolve_command_name(&chars, 0)
    }

    #[test]
    fn every_command_has_exactly_one_row() {
        let mut seen = std::collections::HashSet::new();
        for e in REGISTRY {
            assert!(seen.insert(e.command), "duplicate row for {:?}", e.command);
            assert!(lookup(e.command).is_some());
        }
    }

    #[test]
    fn keywords_are_unique_and_start_with_a_sigil() {
        let mut seen = std::collections::HashSet::new();
        for e in REGISTRY {
            assert!(seen.insert(e.keyword), "duplicate keyword {}", e.keyword);
            assert!(e.keyword.starts_with('#') || e.keyword.starts_with('*'));
            if let Some(max) = e.max_args {
                assert!(e.min_args <= max, "{}", e.keyword);
            }
        }
    }

    #[test]
    fn every_keyword_resolves_to_itself() {
        for e in REGISTRY {
            let src = format!("{}()", e.keyword);
            let (found, open) = resolve(&src).unwrap();
            assert_eq!(found.keyword, e.keyword);
            assert_eq!(open, e.keyword.len());
        }
    }

    #[test]
    fn shared_prefixes_disambiguate() {
        assert_eq!(resolve("#indD()").unwrap().0.command, Command::IndeterminateDeny);
        assert_eq!(
            resolve("#indDP()").unwrap().0.command,
            Command::IndeterminateDenyPermit
        );
        assert_eq!(resolve("*not(#true())").unwrap().0.command, Command::Not);
        assert_eq!(resolve("*notNull(x)").unwrap().0.command, Command::NotNull);
        assert_eq!(resolve("*gte(a,b)").unwrap().0.command, Command::GreaterThanEqual);
        assert_eq!(resolve("*gt(a,b)").unwrap().0.command, Command::GreaterThan);
    }

    #[test]
    fn whitespace_between_keyword_and_group_open() {
        let (found, open) = resolve("*all  (#true())").unwrap();
        assert_eq!(found.command, Command::All);
        assert_eq!(open, 6);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let err = resolve("*GT(a,b)").unwrap_err();
        assert!(matches!(err, PeelError::UnknownCommand { ref candidate, position: 0 } if candidate == "*GT"));
    }

    #[test]
    fn unknown_and_missing_group_open() {
        assert!(matches!(
            resolve("*foo(x)").unwrap_err(),
            PeelError::UnknownCommand { .. }
        ));
        assert!(matches!(
            resolve("*gt x").unwrap_err(),
            PeelError::UnknownCommand { .. }
        ));
        assert!(matches!(
            resolve("#true").unwrap_err(),
            PeelError::MissingGroupOpen {
                keyword: "#true",
                ..
            }
        ));
    }

    #[test]
    fn too_short_input() {
        assert!(matches!(
            resolve("#a").unwrap_err(),
            PeelError::InputTooShort { position: 0 }
        ));
        assert!(matches!(
            resolve("").unwrap_err(),
            PeelError::InputTooShort { .. }
        ));
    }
}
