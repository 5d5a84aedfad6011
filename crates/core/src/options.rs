//! The `#opts(key=value, flag, list=a|b)` mini-language.

use std::collections::{BTreeMap, BTreeSet};

use peel_model::{
    ActionExecutionStrategy, ExecutionMode, Metadata, ValueSource, VariableValueType, Version,
};
use serde::Serialize;

use crate::error::PeelError;
use crate::scanner::{
    scan_content, skip_non_parsable, skip_whitespace, DELIMITER, GROUP_CLOSE, GROUP_OPEN,
};

/// Option keys that may be given without a value, meaning `true`.
pub const BOOLEAN_OPTIONS: &[&str] = &[
    "isJson",
    "negateResult",
    "stringIgnoreCase",
    "fieldsStrictCheck",
    "arrayOrderStrictCheck",
    "strictCheck",
    "optimize",
    "lenientConstraints",
    "ignoreErrors",
    "strictTargetEffect",
    "skipCache",
    "runChildActions",
    "runAction",
    "indeterminateOnActionFail",
    "strictUnlessLogic",
    "failOnMissingKey",
    "failOnExistingKey",
    "failOnNullSource",
    "castNullSourceToArray",
    "failOnNullMerge",
];

const LIST_SEPARATOR: char = '|';

/// Typed options from one `#opts(...)` occurrence.
///
/// Every field is optional; `None` means the consuming object applies its
/// own default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "ver", skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
    #[serde(rename = "desc", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_mode: Option<BTreeSet<ExecutionMode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_json: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time_format: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<VariableValueType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ValueSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negate_result: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_ignore_case: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields_strict_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_order_strict_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_conditions: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lenient_constraints: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_execution_strategy: Option<ActionExecutionStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_errors: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_target_effect: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_cache: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_child_actions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_action: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indeterminate_on_action_fail: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_unless_logic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_on_missing_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_on_existing_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_on_null_source: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast_null_source_to_array: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_on_null_merge: Option<bool>,
}

impl ParsedOptions {
    /// Identity metadata (`id`, `ver`, `desc`, `labels`).
    pub fn metadata(&self) -> Metadata {
        Metadata {
            id: self.id.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            labels: self.labels.clone(),
        }
    }

    /// Convert raw `key -> value` text into typed fields.
    ///
    /// Unknown keys are ignored.
    pub fn from_raw(raw: &BTreeMap<String, String>) -> Result<Self, PeelError> {
        let mut opts = ParsedOptions::default();
        for (key, value) in raw {
            let v = value.as_str();
            match key.as_str() {
                "id" => opts.id = Some(value.clone()),
                "ver" => opts.version = Some(parse_version(v)?),
                "desc" => opts.description = Some(value.clone()),
                "labels" => opts.labels = pipe_list(v),
                "executionMode" => opts.execution_mode = parse_execution_modes(key, v)?,
                "priority" => opts.priority = Some(parse_int(key, v)?),
                "isJson" => opts.is_json = Some(parse_bool(key, v)?),
                "dateFormat" => opts.date_format = Some(value.clone()),
                "timeFormat" => opts.time_format = Some(value.clone()),
                "dateTimeFormat" => opts.date_time_format = Some(value.clone()),
                "type" => {
                    opts.value_type = Some(parse_enum(key, v, VariableValueType::from_literal)?)
                }
                "format" => opts.format = Some(value.clone()),
                "key" => opts.key = Some(value.clone()),
                "source" => opts.source = Some(parse_enum(key, v, ValueSource::from_literal)?),
                "negateResult" => opts.negate_result = Some(parse_bool(key, v)?),
                "stringIgnoreCase" => opts.string_ignore_case = Some(parse_bool(key, v)?),
                "fieldsStrictCheck" => opts.fields_strict_check = Some(parse_bool(key, v)?),
                "arrayOrderStrictCheck" => {
                    opts.array_order_strict_check = Some(parse_bool(key, v)?)
                }
                "strictCheck" => opts.strict_check = Some(parse_bool(key, v)?),
                "minimumConditions" => opts.minimum_conditions = Some(parse_int(key, v)?),
                "optimize" => opts.optimize = Some(parse_bool(key, v)?),
                "lenientConstraints" => opts.lenient_constraints = Some(parse_bool(key, v)?),
                "actionExecutionStrategy" => {
                    opts.action_execution_strategy = Some(parse_enum(
                        key,
                        v,
                        ActionExecutionStrategy::from_literal,
                    )?)
                }
                "ignoreErrors" => opts.ignore_errors = Some(parse_bool(key, v)?),
                "strictTargetEffect" => opts.strict_target_effect = Some(parse_bool(key, v)?),
                "skipCache" => opts.skip_cache = Some(parse_bool(key, v)?),
                "runChildActions" => opts.run_child_actions = Some(parse_bool(key, v)?),
                "runAction" => opts.run_action = Some(parse_bool(key, v)?),
                "indeterminateOnActionFail" => {
                    opts.indeterminate_on_action_fail = Some(parse_bool(key, v)?)
                }
                "strictUnlessLogic" => opts.strict_unless_logic = Some(parse_bool(key, v)?),
                "failOnMissingKey" => opts.fail_on_missing_key = Some(parse_bool(key, v)?),
                "failOnExistingKey" => opts.fail_on_existing_key = Some(parse_bool(key, v)?),
                "failOnNullSource" => opts.fail_on_null_source = Some(parse_bool(key, v)?),
                "castNullSourceToArray" => {
                    opts.cast_null_source_to_array = Some(parse_bool(key, v)?)
                }
                "failOnNullMerge" => opts.fail_on_null_merge = Some(parse_bool(key, v)?),
                other => tracing::debug!(option = other, "ignoring unknown option"),
            }
        }
        Ok(opts)
    }
}

// ──────────────────────────────────────────────
// Value conversion
// ──────────────────────────────────────────────

pub(crate) fn parse_version(value: &str) -> Result<Version, PeelError> {
    Version::parse(value).map_err(|source| PeelError::InvalidVersion {
        value: value.to_string(),
        source,
    })
}

/// Split a `|`-joined value, dropping blank segments. All blank is `None`.
fn pipe_list(value: &str) -> Option<Vec<String>> {
    let items: Vec<String> = value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn invalid(key: &str, value: &str, reason: impl Into<String>) -> PeelError {
    PeelError::InvalidOptionValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, PeelError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(key, value, "expected 'true' or 'false'")),
    }
}

fn parse_int(key: &str, value: &str) -> Result<i32, PeelError> {
    value
        .parse::<i32>()
        .map_err(|e| invalid(key, value, e.to_string()))
}

fn parse_enum<T>(key: &str, value: &str, from_literal: fn(&str) -> Option<T>) -> Result<T, PeelError> {
    from_literal(value).ok_or_else(|| invalid(key, value, "unknown literal"))
}

fn parse_execution_modes(
    key: &str,
    value: &str,
) -> Result<Option<BTreeSet<ExecutionMode>>, PeelError> {
    let Some(items) = pipe_list(value) else {
        return Ok(None);
    };
    let modes = items
        .iter()
        .map(|item| {
            ExecutionMode::from_literal(item)
                .ok_or_else(|| invalid(key, item, "unknown execution mode"))
        })
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok(Some(modes))
}

// ──────────────────────────────────────────────
// Scanning
// ──────────────────────────────────────────────

/// Scan the body of an `#opts` command.
///
/// `pos` points at the command's `(`. Returns the raw entries (later
/// duplicates overwrite earlier ones) and the position after the closing `)`
/// and any trailing non-parsable characters.
pub fn scan_options(
    chars: &[char],
    pos: usize,
    keyword: &'static str,
) -> Result<(BTreeMap<String, String>, usize), PeelError> {
    let not_completed = PeelError::NotCompleted {
        keyword,
        position: pos,
    };
    if chars.get(pos) != Some(&GROUP_OPEN) {
        return Err(PeelError::NotStarted {
            keyword,
            position: pos,
        });
    }

    let mut raw = BTreeMap::new();
    let mut pos = pos + 1;
    loop {
        while pos < chars.len() && (chars[pos] == DELIMITER || chars[pos].is_whitespace()) {
            pos += 1;
        }
        let Some(&c) = chars.get(pos) else {
            return Err(not_completed);
        };
        if c == GROUP_CLOSE {
            return Ok((raw, skip_non_parsable(chars, pos + 1)));
        }

        let key_start = pos;
        while pos < chars.len() && !matches!(chars[pos], '=' | DELIMITER | GROUP_CLOSE) {
            pos += 1;
        }
        if pos >= chars.len() {
            return Err(not_completed);
        }
        let key: String = chars[key_start..pos].iter().collect::<String>().trim().to_string();
        if key.is_empty() {
            return Err(PeelError::EmptyOptionKey {
                position: key_start,
            });
        }

        let value = if chars[pos] == '=' {
            pos = skip_whitespace(chars, pos + 1);
            match chars.get(pos) {
                None => return Err(not_completed),
                Some(&c) if c == DELIMITER || c == GROUP_CLOSE => {
                    return Err(PeelError::EmptyOptionValue { key });
                }
                Some(_) => {
                    let (value, next) = scan_content(chars, pos, DELIMITER)?;
                    pos = next;
                    value
                }
            }
        } else if BOOLEAN_OPTIONS.contains(&key.as_str()) {
            "true".to_string()
        } else {
            return Err(PeelError::EmptyOptionValue { key });
        };

        if value.is_empty() {
            return Err(PeelError::EmptyOptionValue { key });
        }
        raw.insert(key, value);
    }
}
