//! Placeholder expansion for job templates
//!
//! Supports the levant placeholder subset used by job templates:
//!
//! - `[[ .Name ]]` a template variable
//! - `[[ env "NAME" ]]` a process environment variable (empty when unset)
//! - `[[ consulKey "path/to/key" ]]` a Consul KV value

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::errors::DeployError;

const OPEN: &str = "[[";
const CLOSE: &str = "]]";

/// A placeholder expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Var(String),
    Env(String),
    ConsulKey(String),
}

/// A parsed template piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Expr { expr: Expr, line: usize },
}

/// Where `consulKey` values come from
#[async_trait]
pub trait KeyValueSource: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, DeployError>;
}

/// Split a template into text and placeholders
pub fn parse(template: &str) -> Result<Vec<Segment<'_>>, DeployError> {
    let mut segments = Vec::new();
    let mut rest = template;
    let mut offset = 0;

    while let Some(start) = rest.find(OPEN) {
        if start > 0 {
            segments.push(Segment::Text(&rest[..start]));
        }
        let line = line_of(template, offset + start);
        let after_open = &rest[start + OPEN.len()..];
        let end = after_open
            .find(CLOSE)
            .ok_or_else(|| render_error(line, "unclosed placeholder"))?;

        let expr = parse_expr(after_open[..end].trim()).map_err(|e| render_error(line, &e))?;
        segments.push(Segment::Expr { expr, line });

        let consumed = start + OPEN.len() + end + CLOSE.len();
        offset += consumed;
        rest = &rest[consumed..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    Ok(segments)
}

/// Expand every placeholder in the template
pub async fn render(
    template: &str,
    variables: &BTreeMap<String, String>,
    kv: &dyn KeyValueSource,
) -> Result<String, DeployError> {
    let mut out = String::with_capacity(template.len());

    for segment in parse(template)? {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Expr { expr, line } => match expr {
                Expr::Var(name) => {
                    let value = variables.get(&name).ok_or_else(|| {
                        render_error(line, &format!("no value for variable {:?}", name))
                    })?;
                    out.push_str(value);
                }
                Expr::Env(name) => {
                    out.push_str(&std::env::var(&name).unwrap_or_default());
                }
                Expr::ConsulKey(key) => {
                    let value = kv
                        .get(&key)
                        .await
                        .map_err(|e| render_error(line, &format!("consul key {:?}: {}", key, e)))?
                        .ok_or_else(|| {
                            render_error(line, &format!("consul key {:?} not found", key))
                        })?;
                    out.push_str(&value);
                }
            },
        }
    }

    Ok(out)
}

fn parse_expr(inner: &str) -> Result<Expr, String> {
    if let Some(name) = inner.strip_prefix('.') {
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(format!("invalid variable reference {:?}", inner));
        }
        return Ok(Expr::Var(name.to_string()));
    }

    let (func, arg) = inner
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("unsupported expression {:?}", inner))?;
    let arg = string_literal(arg.trim())
        .ok_or_else(|| format!("{} expects a double-quoted argument", func))?;

    match func {
        "env" => Ok(Expr::Env(arg.to_string())),
        "consulKey" => Ok(Expr::ConsulKey(arg.to_string())),
        other => Err(format!("unsupported function {:?}", other)),
    }
}

fn string_literal(arg: &str) -> Option<&str> {
    let inner = arg.strip_prefix('"')?.strip_suffix('"')?;
    (!inner.is_empty() && !inner.contains('"')).then_some(inner)
}

fn line_of(template: &str, byte_offset: usize) -> usize {
    template[..byte_offset].matches('\n').count() + 1
}

fn render_error(line: usize, message: &str) -> DeployError {
    DeployError::Render(format!("line {}: {}", line, message))
}
