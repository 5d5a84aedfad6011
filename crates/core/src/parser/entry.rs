use peel_model::{PolicyAction, PolicyCondition, PolicyEntity, PolicyVariable, ValueResolver};

use super::{Node, Parser};
use crate::config::ParserConfig;
use crate::error::PeelError;
use crate::grammar::EntityKind;
use crate::options::ParsedOptions;

/// The object family a caller asks for; the root command must belong to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Variable,
    Resolver,
    Condition,
    Action,
    Policy,
}

impl Category {
    pub fn accepts(&self, kind: EntityKind) -> bool {
        use EntityKind as K;
        match self {
            Category::Variable => matches!(kind, K::VariableStatic | K::VariableDynamic),
            Category::Resolver => kind == K::ValueResolver,
            Category::Condition => matches!(
                kind,
                K::ConditionAtomic | K::ConditionComposite | K::ConditionDefault
            ),
            Category::Action => kind == K::PolicyAction,
            Category::Policy => matches!(kind, K::Policy | K::PolicySet | K::PolicyDefault),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Variable => "a variable",
            Category::Resolver => "a value resolver",
            Category::Condition => "a condition",
            Category::Action => "a policy action",
            Category::Policy => "a policy",
        }
    }
}

/// Entry points for parsing PEEL text under one [`ParserConfig`].
///
/// Every call owns its own cursor, so a single `PeelParser` can be shared
/// freely between threads.
#[derive(Debug, Clone, Default)]
pub struct PeelParser {
    config: ParserConfig,
}

impl PeelParser {
    pub fn new(config: ParserConfig) -> Self {
        PeelParser { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parse_variable(&self, input: &str) -> Result<PolicyVariable, PeelError> {
        match self.parse(input, Category::Variable)? {
            Node::Variable(v) => Ok(v),
            other => Err(mismatch(Category::Variable, &other)),
        }
    }

    pub fn parse_resolver(&self, input: &str) -> Result<ValueResolver, PeelError> {
        match self.parse(input, Category::Resolver)? {
            Node::Resolver(r) => Ok(r),
            other => Err(mismatch(Category::Resolver, &other)),
        }
    }

    pub fn parse_condition(&self, input: &str) -> Result<PolicyCondition, PeelError> {
        match self.parse(input, Category::Condition)? {
            Node::Condition(c) => Ok(c),
            other => Err(mismatch(Category::Condition, &other)),
        }
    }

    pub fn parse_action(&self, input: &str) -> Result<PolicyAction, PeelError> {
        match self.parse(input, Category::Action)? {
            Node::Action(a) => Ok(a),
            other => Err(mismatch(Category::Action, &other)),
        }
    }

    /// Parse a policy, a policy set or a default policy.
    pub fn parse_policy(&self, input: &str) -> Result<PolicyEntity, PeelError> {
        match self.parse(input, Category::Policy)? {
            Node::Policy(p) => Ok(p),
            other => Err(mismatch(Category::Policy, &other)),
        }
    }

    /// Parse a standalone `#opts(...)` command.
    pub fn parse_options(&self, input: &str) -> Result<ParsedOptions, PeelError> {
        let chars = self.chars(input)?;
        let options = Parser::new(&chars, &self.config).parse_root_options()?;
        tracing::debug!(len = chars.len(), "parsed options");
        Ok(options)
    }

    fn parse(&self, input: &str, category: Category) -> Result<Node, PeelError> {
        let chars = self.chars(input)?;
        let node = Parser::new(&chars, &self.config).parse_root(category)?;
        tracing::debug!(
            category = category.as_str(),
            object = node.describe(),
            len = chars.len(),
            "parsed expression"
        );
        Ok(node)
    }

    fn chars(&self, input: &str) -> Result<Vec<char>, PeelError> {
        let chars: Vec<char> = input.chars().collect();
        match self.config.max_input_len {
            Some(max) if chars.len() > max => Err(PeelError::InputTooLong {
                max,
                actual: chars.len(),
            }),
            _ => Ok(chars),
        }
    }
}

// Deserializers map each entity kind to exactly one node variant, and the
// root kind has already been checked against the category.
fn mismatch(category: Category, node: &Node) -> PeelError {
    PeelError::Deserialize {
        keyword: "",
        message: format!("expected {} but built {}", category.as_str(), node.describe()),
    }
}
