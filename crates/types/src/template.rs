//! Placeholder scanning shared by the invocation engine and discovery.

/// Extracts `{name}` placeholder names from a template string, in order.
///
/// Malformed trailing braces are ignored; empty placeholders are skipped.
pub fn placeholder_names(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut remainder = template;

    while let Some(start) = remainder.find('{') {
        let after_start = &remainder[start + 1..];
        let Some(end) = after_start.find('}') else {
            break;
        };
        let name = after_start[..end].trim();
        if !name.is_empty() && !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
        remainder = &after_start[end + 1..];
    }

    names
}

/// Splits a URL template into its path portion and optional query portion.
pub fn split_query(url: &str) -> (&str, Option<&str>) {
    match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    }
}

/// Placeholder names appearing before the query string.
///
/// These are the tokens discovery synthesizes as required body properties,
/// and the ones invocation refuses to leave unresolved.
pub fn path_placeholder_names(url: &str) -> Vec<String> {
    placeholder_names(split_query(url).0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_placeholders_in_order() {
        let names = placeholder_names("https://api.example.com/{org}/repos/{repo}");
        assert_eq!(names, vec!["org", "repo"]);
    }

    #[test]
    fn deduplicates_repeated_placeholders() {
        let names = placeholder_names("/{id}/copy/{id}");
        assert_eq!(names, vec!["id"]);
    }

    #[test]
    fn ignores_unterminated_braces() {
        assert_eq!(placeholder_names("/users/{id"), Vec::<String>::new());
        assert_eq!(placeholder_names("/users/{}"), Vec::<String>::new());
    }

    #[test]
    fn path_placeholders_exclude_query_tokens() {
        let url = "https://api.example.com/users/{id}?page={page}";
        assert_eq!(path_placeholder_names(url), vec!["id"]);
        let (path, query) = split_query(url);
        assert_eq!(path, "https://api.example.com/users/{id}");
        assert_eq!(query, Some("page={page}"));
    }
}
