//! Declared parameter lists and token binding.
//!
//! Every chat command, every `/engine` sub-command and every item action declares its
//! parameters up front. [`Signature::bind`] assigns the caller's tokens to those parameters
//! the way a direct call would: positionally in order, or by name with `name=value`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Whole number
    Integer,
    /// Decimal number
    Float,
    /// A single token
    Word,
    /// Every remaining positional token, joined by spaces. Must come last.
    Rest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub requirement: Requirement,
}

impl Param {
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            requirement: Requirement::Required,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            requirement: Requirement::Optional,
        }
    }

    pub fn usage_string(&self) -> String {
        let label = match self.kind {
            ParamKind::Rest => format!("{}...", self.name),
            _ => self.name.to_string(),
        };
        match self.requirement {
            Requirement::Required => format!("<{label}>"),
            Requirement::Optional => format!("[{label}]"),
        }
    }
}

/// Why a set of tokens could not be bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    TooManyArguments { expected: usize, got: usize },
    MissingArgument(&'static str),
    UnknownKeyword(String),
    MultipleValues(&'static str),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::TooManyArguments { expected, got } => {
                write!(f, "takes at most {} argument(s) but {} were given", expected, got)
            }
            BindError::MissingArgument(name) => write!(f, "missing argument '{}'", name),
            BindError::UnknownKeyword(name) => write!(f, "unexpected keyword '{}'", name),
            BindError::MultipleValues(name) => write!(f, "multiple values for '{}'", name),
        }
    }
}

impl std::error::Error for BindError {}

/// Ordered parameter declarations of one callable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn new(params: Vec<Param>) -> Self {
        debug_assert!(
            params
                .iter()
                .rev()
                .skip(1)
                .all(|p| p.kind != ParamKind::Rest),
            "rest parameter must be last"
        );
        Self { params }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn usage(&self) -> String {
        self.params
            .iter()
            .map(Param::usage_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn has_rest(&self) -> bool {
        self.params.last().map(|p| p.kind == ParamKind::Rest).unwrap_or(false)
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    /// Bind raw tokens to the declared parameters.
    ///
    /// A `name=value` token binds by name when `name` is a declared parameter. When it is
    /// not, it is a positional token if the signature ends in a rest parameter (free text)
    /// and an unknown keyword otherwise.
    pub fn bind<S: AsRef<str>>(&self, tokens: &[S]) -> Result<BoundArgs, BindError> {
        let mut values: Vec<Option<String>> = vec![None; self.params.len()];
        let mut positional: Vec<&str> = Vec::new();
        let mut keywords: Vec<(usize, &str)> = Vec::new();

        for token in tokens.iter().map(AsRef::as_ref) {
            match split_keyword(token) {
                Some((key, value)) => match self.position_of(key) {
                    Some(idx) if self.params[idx].kind != ParamKind::Rest => {
                        keywords.push((idx, value))
                    }
                    _ if self.has_rest() => positional.push(token),
                    _ => return Err(BindError::UnknownKeyword(key.to_string())),
                },
                None => positional.push(token),
            }
        }

        let fixed = if self.has_rest() {
            self.params.len() - 1
        } else {
            self.params.len()
        };
        if positional.len() > fixed && !self.has_rest() {
            return Err(BindError::TooManyArguments {
                expected: fixed,
                got: positional.len(),
            });
        }
        let (leading, rest) = positional.split_at(positional.len().min(fixed));
        for (slot, token) in leading.iter().enumerate() {
            values[slot] = Some((*token).to_string());
        }
        if !rest.is_empty() {
            values[fixed] = Some(rest.join(" "));
        }

        for (idx, value) in keywords {
            if values[idx].is_some() {
                return Err(BindError::MultipleValues(self.params[idx].name));
            }
            values[idx] = Some(value.to_string());
        }

        let mut bound = HashMap::new();
        for (param, value) in self.params.iter().zip(values) {
            match value {
                Some(v) => {
                    bound.insert(param.name, v);
                }
                None if param.requirement == Requirement::Required => {
                    return Err(BindError::MissingArgument(param.name));
                }
                None => {}
            }
        }
        Ok(BoundArgs { values: bound })
    }
}

fn split_keyword(token: &str) -> Option<(&str, &str)> {
    let (key, value) = token.split_once('=')?;
    let mut chars = key.chars();
    let head_ok = chars
        .next()
        .map(|c| c.is_ascii_lowercase() || c == '_')
        .unwrap_or(false);
    if head_ok && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        Some((key, value))
    } else {
        None
    }
}

/// Tokens assigned to parameter names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundArgs {
    values: HashMap<&'static str, String>,
}

impl BoundArgs {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Parse a bound value. `Ok(None)` when absent, `Err` carries the offending text.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, String> {
        match self.get(name) {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| raw.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_debug() -> Signature {
        Signature::new(vec![Param::optional("value", ParamKind::Word)])
    }

    fn give() -> Signature {
        Signature::new(vec![
            Param::required("player", ParamKind::Word),
            Param::optional("count", ParamKind::Integer),
        ])
    }

    fn mail() -> Signature {
        Signature::new(vec![Param::optional("message", ParamKind::Rest)])
    }

    #[test]
    fn binds_positionally() {
        let args = give().bind(&["alice", "3"]).unwrap();
        assert_eq!(args.get("player"), Some("alice"));
        assert_eq!(args.parse::<i64>("count"), Ok(Some(3)));
    }

    #[test]
    fn optional_may_be_omitted() {
        let args = engine_debug().bind::<&str>(&[]).unwrap();
        assert!(args.is_empty());
        assert_eq!(args.parse::<i64>("value"), Ok(None));
    }

    #[test]
    fn rejects_arity_mismatch() {
        assert_eq!(
            engine_debug().bind(&["on", "off"]),
            Err(BindError::TooManyArguments { expected: 1, got: 2 })
        );
        assert_eq!(give().bind::<&str>(&[]), Err(BindError::MissingArgument("player")));
        assert_eq!(
            Signature::empty().bind(&["x"]),
            Err(BindError::TooManyArguments { expected: 0, got: 1 })
        );
    }

    #[test]
    fn binds_by_keyword() {
        let args = give().bind(&["count=2", "bob"]).unwrap();
        assert_eq!(args.get("player"), Some("bob"));
        assert_eq!(args.get("count"), Some("2"));
        assert_eq!(give().bind(&["bob", "color=red"]), Err(BindError::UnknownKeyword("color".into())));
        assert_eq!(
            give().bind(&["bob", "player=carl"]),
            Err(BindError::MultipleValues("player"))
        );
    }

    #[test]
    fn rest_collects_free_text() {
        let args = mail().bind(&["the", "a=b", "server", "lags"]).unwrap();
        assert_eq!(args.get("message"), Some("the a=b server lags"));
        assert!(mail().bind::<&str>(&[]).unwrap().get("message").is_none());
    }

    #[test]
    fn parse_reports_bad_values() {
        let args = give().bind(&["alice", "many"]).unwrap();
        assert_eq!(args.parse::<i64>("count"), Err("many".to_string()));
    }

    #[test]
    fn usage_lists_parameters() {
        assert_eq!(give().usage(), "<player> [count]");
        assert_eq!(mail().usage(), "[message...]");
    }
}
