//! Canonical forms for free-form fields.
//!
//! The Chef server rewrites what it stores: JSON comes back re-serialized and
//! bare run-list recipes come back qualified. Normalizing both the declared
//! value and the value read back keeps a refresh from reporting drift that
//! is only formatting.

use serde_json::Value;
use tracing::warn;

/// Literal stored when a JSON field cannot be parsed.
pub const INVALID_JSON: &str = "null";

/// Normalize JSON text into its canonical compact form.
///
/// Object keys are emitted in sorted order and all insignificant whitespace
/// is dropped. An empty string stays empty.
///
/// # Silent degradation
///
/// Unparsable input yields [`INVALID_JSON`] instead of an error, so refreshing
/// state never fails on bad cached data. The failure is only reported as a
/// `warn` event. Anything that writes to the server must validate with
/// [`try_normalize_json`] (or decode the field) before reaching this point.
pub fn normalize_json(text: &str) -> String {
    match try_normalize_json(text) {
        Ok(canonical) => canonical,
        Err(e) => {
            warn!(error = %e, "JSON field is not valid JSON, storing null");
            INVALID_JSON.to_string()
        }
    }
}

/// Strict variant of [`normalize_json`] that reports parse failures.
///
/// Callers attach the failing field name when they surface the error.
pub fn try_normalize_json(text: &str) -> Result<String, serde_json::Error> {
    if text.is_empty() {
        return Ok(String::new());
    }

    let mut value: Value = serde_json::from_str(text)?;
    collapse_integral_floats(&mut value);

    Ok(value.to_string())
}

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Rewrite integral floats (`1e2`, `100.0`) as integers so equal numbers
/// render identically.
fn collapse_integral_floats(value: &mut Value) {
    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER {
                    *value = Value::from(f as i64);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(collapse_integral_floats),
        Value::Object(map) => map.values_mut().for_each(collapse_integral_floats),
        _ => {}
    }
}

/// Qualify a bare run-list entry as a recipe.
///
/// `"foo"` becomes `"recipe[foo]"`; anything already using bracket syntax
/// (`recipe[..]`, `role[..]`) is returned unchanged.
pub fn normalize_run_list_entry(entry: &str) -> String {
    if entry.contains('[') {
        entry.to_string()
    } else {
        format!("recipe[{entry}]")
    }
}

/// Normalize every entry of a run list, keeping order and duplicates.
pub fn normalize_run_list<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    entries
        .iter()
        .map(|e| normalize_run_list_entry(e.as_ref()))
        .collect()
}
