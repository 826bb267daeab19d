use std::borrow::Cow;

use once_cell::sync::OnceCell;
use regex::{Captures, Regex};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

use crate::error::BenchError;
use crate::input::QueryDescriptor;

pub const DEFAULT_TEMPLATE: &str = "SELECT time_bucket('1 minute', ts), MIN(usage), MAX(usage) \
     FROM cpu_usage \
     WHERE host='{host}' AND ts BETWEEN '{start_time}' AND '{end_time}' \
     GROUP BY 1";

fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceCell<Regex> = OnceCell::new();
    REGEX.get_or_init(|| Regex::new(r"\{(?P<name>\w+)\}").unwrap())
}

/// SQL text with `{host}`, `{start_time}` and `{end_time}` placeholders.
#[derive(Clone, Debug)]
pub struct QueryTemplate {
    text: String,
}

impl QueryTemplate {
    pub fn new(text: &str) -> Result<QueryTemplate, BenchError> {
        if let Some(caps) = placeholder_regex()
            .captures_iter(text)
            .find(|caps| !matches!(&caps["name"], "host" | "start_time" | "end_time"))
        {
            return Err(BenchError::Argument(format!(
                "Unknown placeholder in query template: '{}'",
                &caps[0]
            )));
        }

        let template = QueryTemplate { text: text.to_string() };
        let sample = QueryDescriptor {
            host: "host_000000".to_string(),
            start_time: "2017-01-01 00:00:00".to_string(),
            end_time: "2017-01-01 01:00:00".to_string(),
        };
        Parser::parse_sql(&PostgreSqlDialect {}, &template.render(&sample)).map_err(|err| {
            BenchError::Argument(format!("Query template is not valid SQL: {}", err))
        })?;
        Ok(template)
    }

    /// Substitutes the descriptor's fields, doubling any single quotes in them.
    pub fn render(&self, descriptor: &QueryDescriptor) -> String {
        placeholder_regex()
            .replace_all(&self.text, |caps: &Captures| {
                let value = match &caps["name"] {
                    "host" => &descriptor.host,
                    "start_time" => &descriptor.start_time,
                    "end_time" => &descriptor.end_time,
                    _ => return caps[0].to_string(),
                };
                escape_literal(value).into_owned()
            })
            .into_owned()
    }
}

fn escape_literal(value: &str) -> Cow<'_, str> {
    if value.contains('\'') {
        Cow::Owned(value.replace('\'', "''"))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(host: &str) -> QueryDescriptor {
        QueryDescriptor {
            host: host.to_string(),
            start_time: "2017-01-01 08:59:22".to_string(),
            end_time: "2017-01-01 09:59:22".to_string(),
        }
    }

    #[test]
    fn it_renders_the_default_template() {
        let template = QueryTemplate::new(DEFAULT_TEMPLATE).unwrap();
        let query = template.render(&descriptor("host_000008"));
        assert_eq!(
            query,
            "SELECT time_bucket('1 minute', ts), MIN(usage), MAX(usage) FROM cpu_usage \
             WHERE host='host_000008' \
             AND ts BETWEEN '2017-01-01 08:59:22' AND '2017-01-01 09:59:22' \
             GROUP BY 1"
        );
    }

    #[test]
    fn it_escapes_quotes() {
        let template = QueryTemplate::new("SELECT 1 WHERE h = '{host}'").unwrap();
        assert_eq!(template.render(&descriptor("o'brien")), "SELECT 1 WHERE h = 'o''brien'");
    }

    #[test]
    fn it_rejects_unknown_placeholders() {
        let err = QueryTemplate::new("SELECT '{hostname}'").unwrap_err();
        assert_eq!(err.to_string(), "Unknown placeholder in query template: '{hostname}'");
    }

    #[test]
    fn it_rejects_invalid_sql() {
        assert!(matches!(
            QueryTemplate::new("SELEKT * FROM cpu_usage WHERE host = '{host}'"),
            Err(BenchError::Argument(_))
        ));
    }
}
