//! Recursive-descent driver for PEEL command strings.
//!
//! A command is parsed bottom-up: every child command is fully deserialized
//! into its domain object before the parent's deserializer runs. The only
//! mutable state is the cursor of the single `Parser` owned by one call.

use peel_model::{
    PolicyAction, PolicyActionRelationship, PolicyCondition, PolicyEntity, PolicyRelationship,
    PolicyVariable, RefOr, Reference, ValueResolver,
};

use crate::config::ParserConfig;
use crate::deserialize;
use crate::error::PeelError;
use crate::grammar::{resolve_command_name, Command, EntityKind, GrammarEntry};
use crate::options::{scan_options, ParsedOptions};
use crate::reference::{resolve_reference, scan_reference};
use crate::scanner::{classify, scan_content, skip_non_parsable, CharClass, DELIMITER};

mod entry;

pub use entry::{Category, PeelParser};

/// A finished child object, as handed to the parent's deserializer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Variable(PolicyVariable),
    Resolver(ValueResolver),
    Condition(PolicyCondition),
    Policy(PolicyEntity),
    Action(PolicyAction),
    ActionRelationship(PolicyActionRelationship),
    PolicyRelationship(PolicyRelationship),
    Reference(Reference),
}

impl Node {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Node::Variable(_) => "variable",
            Node::Resolver(_) => "value resolver",
            Node::Condition(_) => "condition",
            Node::Policy(_) => "policy",
            Node::Action(_) => "policy action",
            Node::ActionRelationship(_) => "action relationship",
            Node::PolicyRelationship(_) => "policy relationship",
            Node::Reference(r) => r.kind_name(),
        }
    }
}

/// Everything collected between a command's parentheses.
#[derive(Debug, Default)]
pub(crate) struct CommandArgs {
    /// Child commands and references, in textual order.
    pub children: Vec<Node>,
    /// Content tokens, in textual order.
    pub contents: Vec<String>,
    pub options: Option<ParsedOptions>,
    pub constraint: Option<RefOr<PolicyCondition>>,
}

impl CommandArgs {
    /// Arguments counted against the grammar bounds; options and constraint excluded.
    pub fn count(&self) -> usize {
        self.children.len() + self.contents.len()
    }
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    chars: &'a [char],
    pos: usize,
    depth: usize,
    config: &'a ParserConfig,
}

impl<'a> Parser<'a> {
    fn new(chars: &'a [char], config: &'a ParserConfig) -> Self {
        Parser {
            chars,
            pos: 0,
            depth: 0,
            config,
        }
    }

    fn enter(&mut self, position: usize) -> Result<(), PeelError> {
        self.depth += 1;
        match self.config.max_depth {
            Some(max) if self.depth > max => Err(PeelError::DepthExceeded { max, position }),
            _ => Ok(()),
        }
    }

    /// Parse the root command, which must belong to `category`.
    fn parse_root(&mut self, category: Category) -> Result<Node, PeelError> {
        let start = skip_non_parsable(self.chars, 0);
        let (entry, open) = resolve_command_name(self.chars, start)?;
        if !category.accepts(entry.kind) {
            return Err(PeelError::UnexpectedRoot {
                expected: category.as_str(),
                keyword: entry.keyword,
                actual: entry.kind,
            });
        }
        let args = self.parse_arguments(entry, start, open)?;
        let node = deserialize::dispatch(entry, args)?;
        self.expect_end()?;
        Ok(node)
    }

    /// Parse a standalone `#opts(...)`.
    fn parse_root_options(&mut self) -> Result<ParsedOptions, PeelError> {
        let start = skip_non_parsable(self.chars, 0);
        let (entry, open) = resolve_command_name(self.chars, start)?;
        if entry.command != Command::Opts {
            return Err(PeelError::UnexpectedRoot {
                expected: "options",
                keyword: entry.keyword,
                actual: entry.kind,
            });
        }
        let (raw, next) = scan_options(self.chars, open, entry.keyword)?;
        self.pos = next;
        self.expect_end()?;
        ParsedOptions::from_raw(&raw)
    }

    fn expect_end(&self) -> Result<(), PeelError> {
        if self.pos < self.chars.len() {
            return Err(PeelError::TrailingInput { position: self.pos });
        }
        Ok(())
    }

    /// Scan a command's parenthesised arguments and check their count.
    ///
    /// `start` is the keyword position, `open` the position of its `(`.
    fn parse_arguments(
        &mut self,
        entry: &'static GrammarEntry,
        start: usize,
        open: usize,
    ) -> Result<CommandArgs, PeelError> {
        self.enter(start)?;
        tracing::trace!(keyword = entry.keyword, kind = %entry.kind, position = start, "command");
        self.pos = open;

        let mut args = CommandArgs::default();
        let mut started = false;
        let mut completed = false;

        while let Some(&c) = self.chars.get(self.pos) {
            match classify(c) {
                CharClass::GroupOpen => {
                    started = true;
                    self.pos += 1;
                }
                CharClass::GroupClose => {
                    completed = true;
                    self.pos = skip_non_parsable(self.chars, self.pos + 1);
                    break;
                }
                CharClass::Delimiter | CharClass::NonParsable => self.pos += 1,
                CharClass::CommandSigil => self.parse_child(entry, &mut args)?,
                CharClass::Content => {
                    let (text, next) = scan_content(self.chars, self.pos, DELIMITER)?;
                    args.contents.push(text);
                    self.pos = next;
                }
            }
        }
        self.depth -= 1;

        if !started {
            return Err(PeelError::NotStarted {
                keyword: entry.keyword,
                position: start,
            });
        }
        if !completed {
            return Err(PeelError::NotCompleted {
                keyword: entry.keyword,
                position: start,
            });
        }
        check_arity(entry, &args)?;
        Ok(args)
    }

    /// Parse the child command at the cursor into `args`.
    ///
    /// `#opts`, `#ref` and `*constraint` are accepted inside any command;
    /// every other child must be of a kind the parent allows.
    fn parse_child(
        &mut self,
        parent: &'static GrammarEntry,
        args: &mut CommandArgs,
    ) -> Result<(), PeelError> {
        let start = self.pos;
        let (entry, open) = resolve_command_name(self.chars, start)?;

        match entry.command {
            Command::Opts => {
                let (raw, next) = scan_options(self.chars, open, entry.keyword)?;
                args.options = Some(ParsedOptions::from_raw(&raw)?);
                self.pos = next;
            }
            Command::Ref => {
                let (entries, next) = scan_reference(self.chars, open, entry.keyword)?;
                args.children
                    .push(Node::Reference(resolve_reference(parent, entries)?));
                self.pos = next;
            }
            Command::Constraint => {
                let inner = self.parse_arguments(entry, start, open)?;
                args.constraint = Some(deserialize::constraint(entry, inner)?);
            }
            _ => {
                if !parent.accepts_child(entry.kind) {
                    return Err(PeelError::UnexpectedChild {
                        parent: parent.keyword,
                        expected: parent.children_list(),
                        keyword: entry.keyword,
                        actual: entry.kind,
                        position: start,
                    });
                }
                let inner = self.parse_arguments(entry, start, open)?;
                args.children.push(deserialize::dispatch(entry, inner)?);
            }
        }
        Ok(())
    }
}

fn check_arity(entry: &GrammarEntry, args: &CommandArgs) -> Result<(), PeelError> {
    let actual = args.count();
    if actual < entry.min_args {
        return Err(PeelError::NotEnoughArguments {
            keyword: entry.keyword,
            min: entry.min_args,
            actual,
        });
    }
    if let Some(max) = entry.max_args {
        if actual > max {
            return Err(PeelError::TooManyArguments {
                keyword: entry.keyword,
                max,
                actual,
            });
        }
    }
    Ok(())
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use peel_model::{OperationType, StaticValue};

    fn condition(src: &str) -> Result<PolicyCondition, PeelError> {
        PeelParser::default().parse_condition(src)
    }

    #[test]
    fn children_keep_textual_order() {
        let c = condition("*gt(#int(2), #int(1))").unwrap();
        let PolicyCondition::Atomic(atomic) = c else {
            panic!("expected atomic condition");
        };
        assert_eq!(atomic.operation, OperationType::GreaterThan);
        let values: Vec<_> = atomic
            .args
            .iter()
            .map(|a| match a {
                RefOr::Value(PolicyVariable::Static(s)) => s.value.clone(),
                other => panic!("unexpected argument {:?}", other),
            })
            .collect();
        assert_eq!(values, vec![StaticValue::Int(2), StaticValue::Int(1)]);
    }

    #[test]
    fn options_and_constraint_do_not_count_as_arguments() {
        let p = PeelParser::default()
            .parse_policy("*permit(#opts(id=p1), *constraint(#true()), #false())")
            .unwrap();
        let PolicyEntity::Policy(policy) = p else {
            panic!("expected policy");
        };
        assert_eq!(policy.metadata.id.as_deref(), Some("p1"));
        assert!(policy.constraint.is_some());
    }

    #[test]
    fn child_kind_must_be_allowed() {
        let err = condition("*gt(#int(1), *key(a))").unwrap_err();
        match err {
            PeelError::UnexpectedChild {
                parent,
                keyword,
                actual,
                position,
                ..
            } => {
                assert_eq!(parent, "*gt");
                assert_eq!(keyword, "*key");
                assert_eq!(actual, EntityKind::ValueResolver);
                assert_eq!(position, 13);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn unclosed_command_is_not_completed() {
        let err = condition("*gt(#int(1), #int(2)").unwrap_err();
        assert!(matches!(
            err,
            PeelError::NotCompleted {
                keyword: "*gt",
                position: 0
            }
        ));
    }

    #[test]
    fn trailing_input_is_rejected() {
        let err = condition("#true() x").unwrap_err();
        assert!(matches!(err, PeelError::TrailingInput { position: 8 }));
        assert!(condition("  #true()  \n").is_ok());
    }

    #[test]
    fn depth_limit() {
        let parser = PeelParser::new(ParserConfig::default().with_max_depth(2));
        assert!(parser.parse_condition("*not(#true())").is_ok());
        let err = parser.parse_condition("*not(*not(#true()))").unwrap_err();
        assert!(matches!(err, PeelError::DepthExceeded { max: 2, position: 10 }));
    }

    #[test]
    fn input_length_limit() {
        let parser = PeelParser::new(ParserConfig::default().with_max_input_len(5));
        let err = parser.parse_condition("#true()").unwrap_err();
        assert!(matches!(err, PeelError::InputTooLong { max: 5, actual: 7 }));
    }
}
