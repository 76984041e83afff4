//! Curl command ingestion.
//!
//! Extracts method, URL, headers, and body from a shell-quoted curl
//! invocation and synthesizes an [`HttpEndpoint`] from them.

use crate::shell::tokenize;
use crate::TranscodeError;
use chrono::Utc;
use toolgate_types::{BodySpec, HeaderSpec, HttpEndpoint, Method, ResponseSpec, ValueType};

/// Headers that are marked required when observed with a nonempty value.
const WELL_KNOWN_REQUIRED_HEADERS: [&str; 3] = ["content-type", "accept", "authorization"];

/// Parses a curl invocation into an endpoint record.
///
/// A leading `curl` token and backslash-newline continuations are tolerated.
/// The method defaults to `GET`, or `POST` when a data flag is present
/// without an explicit `-X`. Parsing fails only when no URL can be located
/// or a flag is missing its value.
pub fn parse_curl_command(command: &str, name: &str, description: &str) -> Result<HttpEndpoint, TranscodeError> {
    let normalized = command.trim().replace("\\\r\n", " ").replace("\\\n", " ");
    let tokens = tokenize(&normalized);

    let mut explicit_method: Option<String> = None;
    let mut url: Option<String> = None;
    let mut headers: Vec<HeaderSpec> = Vec::new();
    let mut data: Option<String> = None;

    let mut index = 0;
    if tokens.first().map(String::as_str) == Some("curl") {
        index = 1;
    }

    while index < tokens.len() {
        let token = tokens[index].as_str();
        match token {
            "-X" | "--request" => {
                let value = expect_value(&tokens, index, token)?;
                if explicit_method.is_none() {
                    explicit_method = Some(value.to_ascii_uppercase());
                }
                index += 2;
            }
            "-H" | "--header" => {
                let value = expect_value(&tokens, index, token)?;
                if let Some(header) = parse_header_line(value) {
                    headers.push(header);
                }
                index += 2;
            }
            "-d" | "--data" | "--data-raw" => {
                let value = expect_value(&tokens, index, token)?;
                if data.is_none() {
                    data = Some(value.to_string());
                }
                index += 2;
            }
            flag if flag.starts_with('-') => {
                // Unknown flag; its value (if any) cannot be a URL, so the
                // URL scan below is not confused by leaving it in place.
                index += 1;
            }
            candidate if url.is_none() && is_url(candidate) => {
                url = Some(candidate.to_string());
                index += 1;
            }
            _ => {
                index += 1;
            }
        }
    }

    let url = url.ok_or(TranscodeError::MissingUrl)?;

    let method = match &explicit_method {
        Some(raw) => raw
            .parse::<Method>()
            .map_err(|_| TranscodeError::unsupported_method(raw.clone()))?,
        None if data.is_some() => Method::Post,
        None => Method::Get,
    };

    let request_body = data.map(|payload| build_body(payload, &headers));

    let now = Utc::now();
    Ok(HttpEndpoint {
        id: String::new(),
        name: name.to_string(),
        description: description.to_string(),
        method,
        path: url,
        headers,
        parameters: Vec::new(),
        request_body,
        responses: vec![ResponseSpec {
            status_code: 200,
            description: "OK".to_string(),
            body: Some(BodySpec {
                content_type: "application/json".to_string(),
                schema: r#"{"type":"object"}"#.to_string(),
                example: String::new(),
            }),
        }],
        version: 0,
        created_at: now,
        updated_at: now,
    })
}

fn expect_value<'t>(tokens: &'t [String], index: usize, flag: &str) -> Result<&'t str, TranscodeError> {
    tokens
        .get(index + 1)
        .map(String::as_str)
        .ok_or_else(|| TranscodeError::missing_flag_value(flag))
}

fn is_url(token: &str) -> bool {
    token.starts_with("http://") || token.starts_with("https://")
}

fn parse_header_line(line: &str) -> Option<HeaderSpec> {
    let (raw_name, raw_value) = line.split_once(':')?;
    let name = raw_name.trim();
    let value = raw_value.trim();
    if name.is_empty() {
        return None;
    }

    let name_lower = name.to_ascii_lowercase();
    // An empty authorization header is a copy-paste artifact; drop it
    // entirely rather than registering an unsatisfiable requirement.
    if name_lower == "authorization" && value.is_empty() {
        return None;
    }

    let required = !value.is_empty() && WELL_KNOWN_REQUIRED_HEADERS.contains(&name_lower.as_str());

    Some(HeaderSpec {
        name: name.to_string(),
        description: format!("The {name} header"),
        required,
        value_type: ValueType::String,
        default_value: value.to_string(),
    })
}

fn build_body(payload: String, headers: &[HeaderSpec]) -> BodySpec {
    let declared_content_type = headers
        .iter()
        .find(|header| header.name.eq_ignore_ascii_case("content-type"))
        .map(|header| header.default_value.clone())
        .filter(|value| !value.is_empty());

    let mut payload = payload;
    let mut is_json = serde_json::from_str::<serde_json::Value>(&payload).is_ok();
    if !is_json && looks_json_shaped(&payload) {
        // One unescape pass for payloads pasted with shell-escaped quotes.
        let unescaped = payload.replace("\\\"", "\"");
        if serde_json::from_str::<serde_json::Value>(&unescaped).is_ok() {
            payload = unescaped;
            is_json = true;
        }
    }

    let content_type = declared_content_type.unwrap_or_else(|| {
        if is_json {
            "application/json".to_string()
        } else {
            "application/x-www-form-urlencoded".to_string()
        }
    });

    BodySpec {
        content_type,
        schema: payload.clone(),
        example: payload,
    }
}

fn looks_json_shaped(payload: &str) -> bool {
    let trimmed = payload.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolgate_types::ParamLocation;

    #[test]
    fn parses_a_plain_get_with_one_header() {
        let endpoint = parse_curl_command(
            r#"curl -H "Accept: application/vnd.github.v3+json" https://api.github.com/users/octocat"#,
            "github-user",
            "Fetch a GitHub user",
        )
        .expect("parse curl");

        assert_eq!(endpoint.method, Method::Get);
        assert_eq!(endpoint.path, "https://api.github.com/users/octocat");
        assert_eq!(endpoint.headers.len(), 1);
        assert_eq!(endpoint.headers[0].name, "Accept");
        assert_eq!(endpoint.headers[0].default_value, "application/vnd.github.v3+json");
        assert!(endpoint.headers[0].required);
        assert!(endpoint.request_body.is_none());
        assert_eq!(endpoint.responses.len(), 1);
        assert_eq!(endpoint.responses[0].status_code, 200);
    }

    #[test]
    fn parses_a_post_with_json_body() {
        let endpoint = parse_curl_command(
            r#"curl -X POST -H "Content-Type: application/json" -d '{"name":"John","age":30}' https://example.com/api/users"#,
            "create-user",
            "",
        )
        .expect("parse curl");

        assert_eq!(endpoint.method, Method::Post);
        let body = endpoint.request_body.expect("request body");
        assert_eq!(body.content_type, "application/json");
        assert_eq!(body.example, r#"{"name":"John","age":30}"#);
    }

    #[test]
    fn data_flag_defaults_method_to_post() {
        let endpoint = parse_curl_command(r#"curl -d '{"a":1}' https://example.com/api"#, "n", "").expect("parse curl");
        assert_eq!(endpoint.method, Method::Post);
    }

    #[test]
    fn explicit_method_is_uppercased_and_wins_over_data_default() {
        let endpoint = parse_curl_command(r#"curl -X put -d '{}' https://example.com/api"#, "n", "").expect("parse curl");
        assert_eq!(endpoint.method, Method::Put);
    }

    #[test]
    fn unknown_method_is_rejected() {
        let error = parse_curl_command("curl -X TRACE https://example.com", "n", "").expect_err("unsupported method");
        assert_eq!(error, TranscodeError::unsupported_method("TRACE"));
    }

    #[test]
    fn missing_url_is_an_error() {
        let error = parse_curl_command("curl -X GET", "n", "").expect_err("missing url");
        assert_eq!(error, TranscodeError::MissingUrl);
    }

    #[test]
    fn flag_without_value_is_an_error() {
        let error = parse_curl_command("curl https://example.com -H", "n", "").expect_err("missing value");
        assert_eq!(error, TranscodeError::missing_flag_value("-H"));
    }

    #[test]
    fn empty_authorization_header_is_dropped() {
        let endpoint = parse_curl_command(
            r#"curl -H 'Authorization: ' -H 'Accept: text/plain' https://example.com"#,
            "n",
            "",
        )
        .expect("parse curl");
        assert_eq!(endpoint.headers.len(), 1);
        assert_eq!(endpoint.headers[0].name, "Accept");
    }

    #[test]
    fn uncommon_headers_are_optional() {
        let endpoint = parse_curl_command(r#"curl -H 'X-Trace-Id: abc' https://example.com"#, "n", "").expect("parse curl");
        assert!(!endpoint.headers[0].required);
    }

    #[test]
    fn line_continuations_collapse_to_spaces() {
        let command = "curl \\\n  -H 'Accept: application/json' \\\n  https://example.com/api";
        let endpoint = parse_curl_command(command, "n", "").expect("parse curl");
        assert_eq!(endpoint.path, "https://example.com/api");
        assert_eq!(endpoint.headers.len(), 1);
    }

    #[test]
    fn escaped_quotes_in_double_quoted_data_survive() {
        let endpoint = parse_curl_command(
            r#"curl -d "{\"name\":\"Ada\"}" https://example.com/api"#,
            "n",
            "",
        )
        .expect("parse curl");
        let body = endpoint.request_body.expect("request body");
        assert_eq!(body.example, r#"{"name":"Ada"}"#);
        assert_eq!(body.content_type, "application/json");
    }

    #[test]
    fn shell_escaped_json_gets_one_unescape_pass() {
        // Single quotes deliver the backslashes verbatim; the parser's
        // unescape pass recovers the JSON.
        let endpoint = parse_curl_command(
            r#"curl -d '{\"name\":\"Ada\"}' https://example.com/api"#,
            "n",
            "",
        )
        .expect("parse curl");
        let body = endpoint.request_body.expect("request body");
        assert_eq!(body.example, r#"{"name":"Ada"}"#);
    }

    #[test]
    fn non_json_data_is_form_encoded() {
        let endpoint = parse_curl_command(r#"curl -d 'a=1&b=2' https://example.com/api"#, "n", "").expect("parse curl");
        let body = endpoint.request_body.expect("request body");
        assert_eq!(body.content_type, "application/x-www-form-urlencoded");
    }

    #[test]
    fn declared_content_type_wins_over_inference() {
        let endpoint = parse_curl_command(
            r#"curl -H 'Content-Type: application/vnd.api+json' -d '{"a":1}' https://example.com"#,
            "n",
            "",
        )
        .expect("parse curl");
        assert_eq!(endpoint.request_body.expect("body").content_type, "application/vnd.api+json");
    }

    #[test]
    fn only_the_first_data_payload_is_kept() {
        let endpoint = parse_curl_command(
            r#"curl -d '{"first":1}' --data-raw '{"second":2}' https://example.com"#,
            "n",
            "",
        )
        .expect("parse curl");
        assert_eq!(endpoint.request_body.expect("body").example, r#"{"first":1}"#);
    }

    #[test]
    fn parsed_endpoint_has_no_parameters_yet() {
        let endpoint = parse_curl_command("curl https://example.com/users/42", "n", "").expect("parse curl");
        assert!(endpoint.parameters.iter().all(|param| param.location != ParamLocation::Path));
        assert!(endpoint.parameters.is_empty());
    }
}
