//! CQL and JQL query builders
//!
//! Every user-supplied value goes through [`escape_cql_value`] before it is
//! placed inside a quoted CQL literal.
//!
//! The space and type builders are not used by the built-in tools; they are
//! exported for callers composing their own Confluence searches.

/// Condition prepended to JQL that consists of an `ORDER BY` clause only.
pub const DEFAULT_JQL_CONDITION: &str = "updated >= -30d";

/// Escape a value for use inside a double-quoted CQL literal.
///
/// Backslashes are doubled before quotes are escaped.
pub fn escape_cql_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// `text ~ "<query>"`, optionally restricted to a space.
pub fn build_text_search_cql(query: &str, space_key: Option<&str>) -> String {
    let cql = format!("text ~ \"{}\"", escape_cql_value(query));
    match space_key.filter(|key| !key.is_empty()) {
        Some(key) => format!("space = \"{}\" AND {}", escape_cql_value(key), cql),
        None => cql,
    }
}

/// `label = "<label>"`
pub fn build_label_search_cql(label: &str) -> String {
    format!("label = \"{}\"", escape_cql_value(label))
}

/// `space = "<key>"`, with an optional trailing condition.
///
/// The extra condition is appended verbatim.
pub fn build_space_cql(space_key: &str, extra: Option<&str>) -> String {
    with_condition(format!("space = \"{}\"", escape_cql_value(space_key)), extra)
}

/// `type = "<type>"`, with an optional trailing condition.
pub fn build_type_cql(content_type: &str, extra: Option<&str>) -> String {
    with_condition(format!("type = \"{}\"", escape_cql_value(content_type)), extra)
}

fn with_condition(cql: String, extra: Option<&str>) -> String {
    match extra.filter(|cond| !cond.is_empty()) {
        Some(cond) => format!("{} AND {}", cql, cond),
        None => cql,
    }
}

/// Repair JQL that has an `ORDER BY` clause but no condition.
///
/// Anything else is returned trimmed and otherwise untouched. This only
/// recognizes the missing-condition pattern; it does not parse JQL.
pub fn validate_and_fix_jql(jql: &str) -> String {
    let trimmed = jql.trim();
    if starts_with_order_by(trimmed) {
        format!("{} {}", DEFAULT_JQL_CONDITION, trimmed)
    } else {
        trimmed.to_string()
    }
}

fn starts_with_order_by(jql: &str) -> bool {
    let Some(rest) = strip_prefix_ignore_case(jql, "order") else {
        return false;
    };
    let after_space = rest.trim_start();
    if after_space.len() == rest.len() {
        return false;
    }
    strip_prefix_ignore_case(after_space, "by").is_some()
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}
