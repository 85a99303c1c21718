//! Variable file loading

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::errors::DeployError;
use crate::filesys::file::File;

/// Default variable files looked up when none are configured, in order
pub const DEFAULT_VARIABLE_FILES: [&str; 2] = ["levant.json", "levant.vars"];

/// Load and merge variable files, later files overriding earlier ones
pub async fn load_variable_files<P: AsRef<Path>>(
    files: &[P],
) -> Result<BTreeMap<String, String>, DeployError> {
    let mut merged = BTreeMap::new();
    for path in files {
        merged.extend(load_variable_file(path.as_ref()).await?);
    }
    Ok(merged)
}

/// Load a single `.json` or `.vars`/`.env` variable file
pub async fn load_variable_file(path: &Path) -> Result<BTreeMap<String, String>, DeployError> {
    let file = File::new(path);
    let extension = file.extension().unwrap_or_default();
    if !matches!(extension.as_str(), "json" | "vars" | "env") {
        return Err(DeployError::Render(format!(
            "variables file extension .{} not supported ({})",
            extension,
            path.display()
        )));
    }

    let contents = file.read_string().await.map_err(|e| {
        DeployError::Render(format!("failed to read variables file {}: {}", path.display(), e))
    })?;

    match extension.as_str() {
        "json" => parse_json_vars(&contents),
        _ => parse_line_vars(&contents),
    }
    .map_err(|e| DeployError::Render(format!("{}: {}", path.display(), e)))
}

/// A flat JSON object of scalar values
pub fn parse_json_vars(contents: &str) -> Result<BTreeMap<String, String>, String> {
    let value: Value = serde_json::from_str(contents).map_err(|e| e.to_string())?;
    let Value::Object(object) = value else {
        return Err("expected a JSON object".to_string());
    };

    object
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(format!("variable {} must be a scalar", key));
                }
            };
            Ok((key, value))
        })
        .collect()
}

/// `KEY=value` lines; blank lines and `#` comments are skipped
pub fn parse_line_vars(contents: &str) -> Result<BTreeMap<String, String>, String> {
    let mut vars = BTreeMap::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| format!("line {}: expected KEY=value", index + 1))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("line {}: empty variable name", index + 1));
        }

        vars.insert(key.to_string(), unquote(value.trim()).to_string());
    }
    Ok(vars)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_vars() {
        let vars = parse_line_vars(
            "# defaults\n\nRegion=us-west\nCount = 3\nGreeting=\"hello world\"\nEmpty=\nUrl=http://x/?a=b\n",
        )
        .unwrap();

        assert_eq!(vars["Region"], "us-west");
        assert_eq!(vars["Count"], "3");
        assert_eq!(vars["Greeting"], "hello world");
        assert_eq!(vars["Empty"], "");
        assert_eq!(vars["Url"], "http://x/?a=b");
    }

    #[test]
    fn test_parse_line_vars_errors() {
        assert!(parse_line_vars("Region us-west").unwrap_err().contains("line 1"));
        assert!(parse_line_vars("ok=1\n=value").unwrap_err().contains("line 2"));
    }

    #[test]
    fn test_parse_json_vars() {
        let vars = parse_json_vars(r#"{"Region": "eu", "Count": 2, "Canary": true, "Note": null}"#)
            .unwrap();
        assert_eq!(vars["Region"], "eu");
        assert_eq!(vars["Count"], "2");
        assert_eq!(vars["Canary"], "true");
        assert_eq!(vars["Note"], "");

        assert!(parse_json_vars(r#"{"Ports": [80]}"#).is_err());
        assert!(parse_json_vars("[]").is_err());
    }

    #[tokio::test]
    async fn test_later_files_override_earlier() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("base.vars");
        let prod = tmp.path().join("prod.json");
        std::fs::write(&base, "Region=us-west\nCount=1\n").unwrap();
        std::fs::write(&prod, r#"{"Count": 5}"#).unwrap();

        let vars = load_variable_files(&[base, prod]).await.unwrap();
        assert_eq!(vars["Region"], "us-west");
        assert_eq!(vars["Count"], "5");
    }

    #[tokio::test]
    async fn test_unsupported_extension() {
        let err = load_variable_file(Path::new("vars.yaml")).await.unwrap_err();
        assert!(matches!(err, DeployError::Render(_)));
        assert!(err.to_string().contains("extension .yaml not supported"));
    }
}
