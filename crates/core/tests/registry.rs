//! Properties that must hold for every row of the grammar table.

use peel_core::{
    parse_action, parse_condition, parse_policy, parse_resolver, parse_variable, Command,
    EntityKind, GrammarEntry, PeelError, REGISTRY,
};
use peel_model::{PolicyCondition, PolicyEntity, PolicyVariable};

/// Parse `src` through the entry point for `kind` and report the kind built.
///
/// Wrapper kinds are embedded in a host command; only their success matters.
fn parse_as(kind: EntityKind, src: &str) -> Result<EntityKind, PeelError> {
    match kind {
        EntityKind::VariableStatic | EntityKind::VariableDynamic => {
            Ok(match parse_variable(src)? {
                PolicyVariable::Static(_) => EntityKind::VariableStatic,
                PolicyVariable::Dynamic(_) => EntityKind::VariableDynamic,
            })
        }
        EntityKind::ValueResolver => parse_resolver(src).map(|_| EntityKind::ValueResolver),
        EntityKind::ConditionAtomic
        | EntityKind::ConditionComposite
        | EntityKind::ConditionDefault => Ok(match parse_condition(src)? {
            PolicyCondition::Atomic(_) => EntityKind::ConditionAtomic,
            PolicyCondition::Composite(_) => EntityKind::ConditionComposite,
            PolicyCondition::Default { .. } => EntityKind::ConditionDefault,
        }),
        EntityKind::Policy | EntityKind::PolicySet | EntityKind::PolicyDefault => {
            Ok(match parse_policy(src)? {
                PolicyEntity::Policy(_) => EntityKind::Policy,
                PolicyEntity::Set(_) => EntityKind::PolicySet,
                PolicyEntity::Default { .. } => EntityKind::PolicyDefault,
            })
        }
        EntityKind::PolicyAction => parse_action(src).map(|_| EntityKind::PolicyAction),
        EntityKind::ActionRelationship | EntityKind::Constraint => {
            parse_policy(&format!("*permit(#true(), {})", src)).map(|_| kind)
        }
        EntityKind::PolicyRelationship => {
            parse_policy(&format!("*DOverrides({})", src)).map(|_| kind)
        }
        EntityKind::Reference | EntityKind::Options => {
            panic!("{} has its own scanner", kind)
        }
    }
}

fn static_literal(command: Command) -> &'static str {
    match command {
        Command::Str => "a",
        Command::Date => "2024-01-01",
        Command::DateTime => "2024-01-01T00:00:00Z",
        Command::Time => "10:00:00",
        Command::Period => "P1D",
        Command::Duration => "PT1S",
        Command::Int | Command::Long | Command::Number | Command::Float | Command::BigDecimal => {
            "1"
        }
        Command::Bool => "true",
        Command::Object => "`{}`",
        Command::Array => "`[]`",
        other => panic!("{:?} is not a static variable", other),
    }
}

/// One argument of a kind `entry` accepts.
fn unit_argument(entry: &GrammarEntry) -> &'static str {
    match entry.kind {
        EntityKind::VariableStatic => static_literal(entry.command),
        EntityKind::ValueResolver | EntityKind::ConditionDefault | EntityKind::PolicyDefault => "a",
        EntityKind::VariableDynamic => "*key(a)",
        EntityKind::ConditionAtomic => "#int(1)",
        EntityKind::ConditionComposite | EntityKind::Policy | EntityKind::Constraint => "#true()",
        EntityKind::PolicySet | EntityKind::PolicyRelationship => "#permit()",
        EntityKind::PolicyAction if entry.command == Command::Clear => "k",
        EntityKind::PolicyAction => "#int(1)",
        EntityKind::ActionRelationship => "*clear(k)",
        EntityKind::Reference | EntityKind::Options => unreachable!(),
    }
}

fn instance(entry: &GrammarEntry, n: usize) -> String {
    let mut args: Vec<&str> = Vec::new();
    if entry.command == Command::NOf {
        args.push("#opts(minimumConditions=1)");
    }
    if entry.kind == EntityKind::PolicyAction && entry.command != Command::Clear && n > 0 {
        args.push("key");
        args.extend(std::iter::repeat(unit_argument(entry)).take(n - 1));
    } else {
        args.extend(std::iter::repeat(unit_argument(entry)).take(n));
    }
    format!("{}({})", entry.keyword, args.join(", "))
}

fn checked_entries() -> impl Iterator<Item = &'static GrammarEntry> {
    REGISTRY
        .iter()
        .filter(|e| !matches!(e.kind, EntityKind::Reference | EntityKind::Options))
}

#[test]
fn minimal_instance_builds_its_entity_kind() {
    for entry in checked_entries() {
        let src = instance(entry, entry.min_args);
        let built = parse_as(entry.kind, &src)
            .unwrap_or_else(|e| panic!("{} failed: {}", src, e));
        assert_eq!(built, entry.kind, "{}", src);
    }
}

#[test]
fn too_few_arguments_are_rejected() {
    for entry in checked_entries().filter(|e| e.min_args > 0) {
        let src = instance(entry, entry.min_args - 1);
        match parse_as(entry.kind, &src) {
            Err(PeelError::NotEnoughArguments {
                keyword,
                min,
                actual,
            }) => {
                assert_eq!(keyword, entry.keyword, "{}", src);
                assert_eq!(min, entry.min_args, "{}", src);
                assert_eq!(actual, entry.min_args - 1, "{}", src);
            }
            other => panic!("{}: expected not-enough-arguments, got {:?}", src, other),
        }
    }
}

#[test]
fn too_many_arguments_are_rejected() {
    for entry in checked_entries() {
        let Some(max) = entry.max_args else {
            continue;
        };
        let src = instance(entry, max + 1);
        match parse_as(entry.kind, &src) {
            Err(PeelError::TooManyArguments {
                keyword,
                max: reported,
                actual,
            }) => {
                assert_eq!(keyword, entry.keyword, "{}", src);
                assert_eq!(reported, max, "{}", src);
                assert_eq!(actual, max + 1, "{}", src);
            }
            other => panic!("{}: expected too-many-arguments, got {:?}", src, other),
        }
    }
}

#[test]
fn options_and_constraints_are_not_arguments() {
    let src = "*not(#opts(negateResult), #opts(optimize), #true())";
    assert!(parse_condition(src).is_ok());
    let src = "*permit(*constraint(#true()), *constraint(#false()), #null())";
    let PolicyEntity::Policy(p) = parse_policy(src).unwrap() else {
        panic!("expected policy");
    };
    // The last constraint wins, like repeated options.
    assert!(matches!(
        p.constraint,
        Some(peel_model::RefOr::Value(PolicyCondition::Default {
            value: peel_model::PolicyConditionDefault::False
        }))
    ));
}

#[test]
fn repeated_options_overwrite() {
    let PolicyCondition::Composite(c) =
        parse_condition("*not(#opts(id=a, optimize), #true(), #opts(id=b))").unwrap()
    else {
        panic!("expected composite");
    };
    assert_eq!(c.metadata.id.as_deref(), Some("b"));
    assert_eq!(c.optimize, None);
}
