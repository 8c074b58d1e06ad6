//! `@@include` expansion.
//!
//! ```html
//! @@include('_header.html', {"title": "Home", "nav": {"active": "index"}})
//! <h1>@@title</h1>          <!-- inside _header.html -->
//! <li class="@@nav.active">
//! ```
//!
//! Paths are relative to the file that contains the directive. The JSON
//! context is merged over the includer's context, so nested partials see
//! every variable set above them. Unknown variables are left untouched.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow, bail};
use regex::{Captures, Regex};
use serde_json::{Map, Value};

const DIRECTIVE: &str = "@@include(";

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@@([A-Za-z_]\w*(?:\.[A-Za-z_]\w*)*)").expect("valid variable regex")
});

/// Read `path` and expand every include it reaches.
pub fn expand_file(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut stack = vec![canonical(path)];
    expand(&content, path, &Map::new(), &mut stack)
}

/// Expand includes in `content`, which was read from `path`.
pub fn expand(
    content: &str,
    path: &Path,
    context: &Map<String, Value>,
    stack: &mut Vec<PathBuf>,
) -> Result<String> {
    let content = substitute(content, context);
    let base = path.parent().unwrap_or(Path::new("."));

    let mut out = String::with_capacity(content.len());
    let mut rest = content.as_str();

    while let Some(start) = rest.find(DIRECTIVE) {
        out.push_str(&rest[..start]);
        let after = &rest[start + DIRECTIVE.len()..];
        let (directive, consumed) = parse_directive(after)
            .with_context(|| format!("malformed @@include in {}", path.display()))?;

        let target = base.join(&directive.path);
        let key = canonical(&target);
        if stack.contains(&key) {
            let chain: Vec<String> = stack
                .iter()
                .chain(std::iter::once(&key))
                .map(|p| p.display().to_string())
                .collect();
            bail!("cyclic @@include: {}", chain.join(" -> "));
        }

        let included = std::fs::read_to_string(&target).with_context(|| {
            format!(
                "@@include('{}') in {}: file not found",
                directive.path,
                path.display()
            )
        })?;

        let mut merged = context.clone();
        merged.extend(directive.context);

        stack.push(key);
        let expanded = expand(&included, &target, &merged, stack)?;
        stack.pop();

        out.push_str(&expanded);
        rest = &after[consumed..];
    }

    out.push_str(rest);
    Ok(out)
}

struct Directive {
    path: String,
    context: Map<String, Value>,
}

/// Parse `'path'[, {json}])` and return the directive plus bytes consumed.
fn parse_directive(input: &str) -> Result<(Directive, usize)> {
    let mut pos = skip_ws(input, 0);
    let quote = input[pos..]
        .chars()
        .next()
        .filter(|c| *c == '\'' || *c == '"')
        .ok_or_else(|| anyhow!("expected a quoted path"))?;
    pos += 1;
    let end = input[pos..]
        .find(quote)
        .ok_or_else(|| anyhow!("unterminated path string"))?;
    let path = input[pos..pos + end].to_string();
    pos = skip_ws(input, pos + end + 1);

    let mut context = Map::new();
    if input[pos..].starts_with(',') {
        pos = skip_ws(input, pos + 1);
        let len = json_object_len(&input[pos..])?;
        let value: Value = serde_json::from_str(&input[pos..pos + len])
            .context("invalid JSON context")?;
        if let Value::Object(map) = value {
            context = map;
        }
        pos = skip_ws(input, pos + len);
    }

    if !input[pos..].starts_with(')') {
        bail!("expected `)`");
    }
    Ok((Directive { path, context }, pos + 1))
}

fn skip_ws(input: &str, from: usize) -> usize {
    from + input[from..].len() - input[from..].trim_start().len()
}

/// Length of the balanced `{...}` at the start of `input`, honoring strings.
fn json_object_len(input: &str) -> Result<usize> {
    if !input.starts_with('{') {
        bail!("expected a JSON object");
    }
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i + 1);
                }
            }
            _ => {}
        }
    }
    bail!("unterminated JSON object")
}

/// Replace `@@name` / `@@a.b` with values from `context`.
fn substitute(content: &str, context: &Map<String, Value>) -> String {
    if context.is_empty() {
        return content.to_string();
    }
    VARIABLE
        .replace_all(content, |caps: &Captures| {
            let name = &caps[1];
            if name == "include" {
                return caps[0].to_string();
            }
            match lookup(context, name) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) => String::new(),
                Some(other) => other.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn lookup<'a>(context: &'a Map<String, Value>, dotted: &str) -> Option<&'a Value> {
    let mut parts = dotted.split('.');
    let mut value = context.get(parts.next()?)?;
    for part in parts {
        value = value.as_object()?.get(part)?;
    }
    Some(value)
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
