//! Request-body validation for movie records.
//!
//! Both entry points take the raw JSON body and either return the typed
//! fields or every problem found, each tagged with the path of the offending
//! field. Keys that are not part of a movie (including `id`) are ignored.

use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

use super::model::{Genre, MovieFields, MoviePatch};

pub const MIN_YEAR: i64 = 1900;
pub const MAX_YEAR: i64 = 2024;
pub const MIN_RATE: f64 = 0.0;
pub const MAX_RATE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    TooSmall,
    TooBig,
    InvalidString,
    InvalidEnumValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(&'static str),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub code: IssueCode,
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl Issue {
    /// Dotted form of the path, e.g. `genre.1`.
    pub fn field(&self) -> String {
        self.path
            .iter()
            .map(|seg| match seg {
                PathSegment::Key(key) => key.to_string(),
                PathSegment::Index(idx) => idx.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// All issues found in one body. Serializes as a bare JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("invalid movie: {}", summarize(.issues))]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

fn summarize(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| format!("{}: {}", issue.field(), issue.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate a complete movie. `rate` falls back to 0 when absent.
pub fn validate_full(input: &Value) -> Result<MovieFields, ValidationError> {
    let mut fields = Fields::new(input, Mode::Full)?;

    let title = fields.title();
    let year = fields.year();
    let director = fields.director();
    let duration = fields.duration();
    let rate = fields.rate();
    let poster = fields.poster();
    let genre = fields.genre();

    match (title, year, director, duration, poster, genre) {
        (Some(title), Some(year), Some(director), Some(duration), Some(poster), Some(genre))
            if fields.issues.is_empty() =>
        {
            Ok(MovieFields {
                title,
                year,
                director,
                duration,
                rate: rate.unwrap_or(MIN_RATE),
                poster,
                genre,
            })
        }
        _ => Err(fields.into_error()),
    }
}

/// Validate an update body: every field is optional, absent ones stay `None`.
pub fn validate_partial(input: &Value) -> Result<MoviePatch, ValidationError> {
    let mut fields = Fields::new(input, Mode::Partial)?;

    let patch = MoviePatch {
        title: fields.title(),
        year: fields.year(),
        director: fields.director(),
        duration: fields.duration(),
        rate: fields.rate(),
        poster: fields.poster(),
        genre: fields.genre(),
    };

    if fields.issues.is_empty() {
        Ok(patch)
    } else {
        Err(fields.into_error())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Full,
    Partial,
}

struct Fields<'a> {
    obj: &'a Map<String, Value>,
    mode: Mode,
    issues: Vec<Issue>,
}

impl<'a> Fields<'a> {
    fn new(input: &'a Value, mode: Mode) -> Result<Self, ValidationError> {
        match input {
            Value::Object(obj) => Ok(Self {
                obj,
                mode,
                issues: Vec::new(),
            }),
            other => Err(ValidationError {
                issues: vec![Issue {
                    code: IssueCode::InvalidType,
                    path: Vec::new(),
                    message: format!("Expected object, received {}", type_name(other)),
                }],
            }),
        }
    }

    fn into_error(self) -> ValidationError {
        ValidationError {
            issues: self.issues,
        }
    }

    fn push(&mut self, code: IssueCode, path: Vec<PathSegment>, message: impl Into<String>) {
        self.issues.push(Issue {
            code,
            path,
            message: message.into(),
        });
    }

    /// Fetch a key, recording a missing-field issue when it is mandatory.
    fn lookup(&mut self, key: &'static str, required: bool, missing: &str) -> Option<&'a Value> {
        let obj = self.obj;
        match obj.get(key) {
            Some(value) => Some(value),
            None => {
                if required && self.mode == Mode::Full {
                    self.push(IssueCode::InvalidType, vec![PathSegment::Key(key)], missing);
                }
                None
            }
        }
    }

    fn string(&mut self, key: &'static str, missing: &str, wrong_type: Option<&str>) -> Option<String> {
        let value = self.lookup(key, true, missing)?;
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                let message = match wrong_type {
                    Some(msg) => msg.to_string(),
                    None => format!("Expected string, received {}", type_name(other)),
                };
                self.push(IssueCode::InvalidType, vec![PathSegment::Key(key)], message);
                None
            }
        }
    }

    fn number(&mut self, key: &'static str, required: bool) -> Option<f64> {
        let value = self.lookup(key, required, "Required")?;
        match value.as_f64() {
            Some(n) => Some(n),
            None => {
                self.push(
                    IssueCode::InvalidType,
                    vec![PathSegment::Key(key)],
                    format!("Expected number, received {}", type_name(value)),
                );
                None
            }
        }
    }

    /// Integer fields are read exactly. A whole number outside the `i64`
    /// range is reported as out of bounds instead of being clamped.
    fn integer(&mut self, key: &'static str, required: bool) -> Option<i64> {
        let value = self.lookup(key, required, "Required")?;
        let Value::Number(num) = value else {
            self.push(
                IssueCode::InvalidType,
                vec![PathSegment::Key(key)],
                format!("Expected number, received {}", type_name(value)),
            );
            return None;
        };
        if let Some(n) = num.as_i64() {
            return Some(n);
        }

        let n = num.as_f64().unwrap_or(f64::NAN);
        if !n.is_finite() || n.fract() != 0.0 {
            self.push(
                IssueCode::InvalidType,
                vec![PathSegment::Key(key)],
                "Expected integer, received float",
            );
        } else if n >= i64::MAX as f64 {
            self.push(
                IssueCode::TooBig,
                vec![PathSegment::Key(key)],
                format!("Number must be less than or equal to {}", i64::MAX),
            );
        } else if n < i64::MIN as f64 {
            self.push(
                IssueCode::TooSmall,
                vec![PathSegment::Key(key)],
                format!("Number must be greater than or equal to {}", i64::MIN),
            );
        } else {
            return Some(n as i64);
        }
        None
    }

    fn at_least<T: PartialOrd + std::fmt::Display>(&mut self, key: &'static str, n: T, min: T) {
        if n < min {
            self.push(
                IssueCode::TooSmall,
                vec![PathSegment::Key(key)],
                format!("Number must be greater than or equal to {}", min),
            );
        }
    }

    fn at_most<T: PartialOrd + std::fmt::Display>(&mut self, key: &'static str, n: T, max: T) {
        if n > max {
            self.push(
                IssueCode::TooBig,
                vec![PathSegment::Key(key)],
                format!("Number must be less than or equal to {}", max),
            );
        }
    }

    fn title(&mut self) -> Option<String> {
        let title = self.string(
            "title",
            "Movie title is required",
            Some("Movie title must be a string"),
        )?;
        if title.is_empty() {
            self.push(
                IssueCode::TooSmall,
                vec![PathSegment::Key("title")],
                "Movie title must not be empty",
            );
            return None;
        }
        Some(title)
    }

    fn year(&mut self) -> Option<i64> {
        let n = self.integer("year", true)?;
        let before = self.issues.len();
        self.at_least("year", n, MIN_YEAR);
        self.at_most("year", n, MAX_YEAR);
        (self.issues.len() == before).then_some(n)
    }

    fn director(&mut self) -> Option<String> {
        self.string("director", "Required", None)
    }

    fn duration(&mut self) -> Option<i64> {
        let n = self.integer("duration", true)?;
        if n <= 0 {
            self.push(
                IssueCode::TooSmall,
                vec![PathSegment::Key("duration")],
                "Number must be greater than 0",
            );
            return None;
        }
        Some(n)
    }

    fn rate(&mut self) -> Option<f64> {
        let n = self.number("rate", false)?;
        let before = self.issues.len();
        self.at_least("rate", n, MIN_RATE);
        self.at_most("rate", n, MAX_RATE);
        (self.issues.len() == before).then_some(n)
    }

    fn poster(&mut self) -> Option<String> {
        let poster = self.string("poster", "Required", None)?;
        if Url::parse(&poster).is_err() {
            self.push(
                IssueCode::InvalidString,
                vec![PathSegment::Key("poster")],
                "Poster must be a valid URL",
            );
            return None;
        }
        Some(poster)
    }

    fn genre(&mut self) -> Option<Vec<Genre>> {
        let value = self.lookup("genre", true, "Movie genre is required")?;
        let Value::Array(entries) = value else {
            self.push(
                IssueCode::InvalidType,
                vec![PathSegment::Key("genre")],
                "Movie genre must be an array of enum Genre",
            );
            return None;
        };
        if entries.is_empty() {
            self.push(
                IssueCode::TooSmall,
                vec![PathSegment::Key("genre")],
                "Movie genre must contain at least one genre",
            );
            return None;
        }

        let before = self.issues.len();
        let mut genres = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            let path = vec![PathSegment::Key("genre"), PathSegment::Index(idx)];
            match entry {
                Value::String(label) => match Genre::from_label(label) {
                    Some(genre) => genres.push(genre),
                    None => self.push(
                        IssueCode::InvalidEnumValue,
                        path,
                        format!(
                            "Invalid enum value. Expected {}, received '{}'",
                            genre_options(),
                            label
                        ),
                    ),
                },
                other => self.push(
                    IssueCode::InvalidType,
                    path,
                    format!("Expected {}, received {}", genre_options(), type_name(other)),
                ),
            }
        }
        (self.issues.len() == before).then_some(genres)
    }
}

fn genre_options() -> String {
    Genre::ALL
        .iter()
        .map(|g| format!("'{}'", g.as_str()))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "title": "Inception",
            "year": 2010,
            "director": "Christopher Nolan",
            "duration": 148,
            "rate": 8.8,
            "poster": "https://m.media-amazon.com/images/inception.jpg",
            "genre": ["Action", "Sci-Fi"]
        })
    }

    fn fields_of(err: &ValidationError) -> Vec<String> {
        err.issues.iter().map(|i| i.field()).collect()
    }

    #[test]
    fn test_full_accepts_valid_movie() {
        let fields = validate_full(&valid()).unwrap();
        assert_eq!(fields.title, "Inception");
        assert_eq!(fields.year, 2010);
        assert_eq!(fields.duration, 148);
        assert_eq!(fields.rate, 8.8);
        assert_eq!(fields.genre, vec![Genre::Action, Genre::SciFi]);
    }

    #[test]
    fn test_full_defaults_rate() {
        let mut input = valid();
        input.as_object_mut().unwrap().remove("rate");
        let fields = validate_full(&input).unwrap();
        assert_eq!(fields.rate, 0.0);
    }

    #[test]
    fn test_full_ignores_unknown_keys() {
        let mut input = valid();
        input["id"] = json!("client-chosen");
        input["extra"] = json!(true);
        assert!(validate_full(&input).is_ok());
    }

    #[test]
    fn test_full_reports_missing_fields() {
        let err = validate_full(&json!({})).unwrap_err();
        assert_eq!(
            fields_of(&err),
            vec!["title", "year", "director", "duration", "poster", "genre"]
        );
        assert_eq!(err.issues[0].message, "Movie title is required");
        assert_eq!(err.issues[1].message, "Required");
        assert_eq!(err.issues[5].message, "Movie genre is required");
        assert!(err.issues.iter().all(|i| i.code == IssueCode::InvalidType));
    }

    #[test]
    fn test_full_rejects_bounds() {
        let mut input = valid();
        input["year"] = json!(1899);
        input["duration"] = json!(-5);
        input["rate"] = json!(11);
        let err = validate_full(&input).unwrap_err();
        assert_eq!(fields_of(&err), vec!["year", "duration", "rate"]);
        assert_eq!(err.issues[0].code, IssueCode::TooSmall);
        assert_eq!(
            err.issues[0].message,
            "Number must be greater than or equal to 1900"
        );
        assert_eq!(err.issues[1].message, "Number must be greater than 0");
        assert_eq!(err.issues[2].code, IssueCode::TooBig);
        assert_eq!(err.issues[2].message, "Number must be less than or equal to 10");
    }

    #[test]
    fn test_year_bounds_inclusive() {
        for year in [1900, 2024] {
            let mut input = valid();
            input["year"] = json!(year);
            assert!(validate_full(&input).is_ok(), "year {}", year);
        }
        let mut input = valid();
        input["year"] = json!(2025);
        assert!(validate_full(&input).is_err());
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut input = valid();
        input["duration"] = json!(0);
        let err = validate_full(&input).unwrap_err();
        assert_eq!(fields_of(&err), vec!["duration"]);
    }

    #[test]
    fn test_year_must_be_integer() {
        let mut input = valid();
        input["year"] = json!(1999.5);
        let err = validate_full(&input).unwrap_err();
        assert_eq!(err.issues[0].message, "Expected integer, received float");
    }

    #[test]
    fn test_whole_float_year_accepted() {
        let input: Value = serde_json::from_str(
            r#"{"title":"t","year":1999.0,"director":"d","duration":90,
                "poster":"https://a.b/c.jpg","genre":["Drama"]}"#,
        )
        .unwrap();
        assert_eq!(validate_full(&input).unwrap().year, 1999);
    }

    #[test]
    fn test_large_duration_kept_exact() {
        let mut input = valid();
        input["duration"] = json!(9007199254740993_i64);
        let fields = validate_full(&input).unwrap();
        assert_eq!(fields.duration, 9007199254740993);
    }

    #[test]
    fn test_duration_beyond_i64_rejected() {
        let mut input = valid();
        input["duration"] = json!(1e20);
        let err = validate_full(&input).unwrap_err();
        assert_eq!(fields_of(&err), vec!["duration"]);
        assert_eq!(err.issues[0].code, IssueCode::TooBig);

        let patch: Value = serde_json::from_str(r#"{"duration": 10000000000000000000}"#).unwrap();
        let err = validate_partial(&patch).unwrap_err();
        assert_eq!(err.issues[0].code, IssueCode::TooBig);
        assert_eq!(
            err.issues[0].message,
            "Number must be less than or equal to 9223372036854775807"
        );

        let patch = json!({"year": -1e20});
        let err = validate_partial(&patch).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].code, IssueCode::TooSmall);
    }

    #[test]
    fn test_type_mismatch() {
        let mut input = valid();
        input["year"] = json!("2010");
        input["title"] = json!(42);
        input["director"] = Value::Null;
        let err = validate_full(&input).unwrap_err();
        assert_eq!(fields_of(&err), vec!["title", "year", "director"]);
        assert_eq!(err.issues[0].message, "Movie title must be a string");
        assert_eq!(err.issues[1].message, "Expected number, received string");
        assert_eq!(err.issues[2].message, "Expected string, received null");
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut input = valid();
        input["title"] = json!("");
        let err = validate_full(&input).unwrap_err();
        assert_eq!(err.issues[0].code, IssueCode::TooSmall);
    }

    #[test]
    fn test_poster_must_be_url() {
        let mut input = valid();
        input["poster"] = json!("not a url");
        let err = validate_full(&input).unwrap_err();
        assert_eq!(err.issues[0].code, IssueCode::InvalidString);
        assert_eq!(err.issues[0].message, "Poster must be a valid URL");
    }

    #[test]
    fn test_genre_errors() {
        let mut input = valid();
        input["genre"] = json!(["Drama", "NotAGenre", 3]);
        let err = validate_full(&input).unwrap_err();
        assert_eq!(fields_of(&err), vec!["genre.1", "genre.2"]);
        assert_eq!(err.issues[0].code, IssueCode::InvalidEnumValue);
        assert!(err.issues[0].message.ends_with("received 'NotAGenre'"));
        assert_eq!(err.issues[1].code, IssueCode::InvalidType);

        input["genre"] = json!("Drama");
        let err = validate_full(&input).unwrap_err();
        assert_eq!(err.issues[0].message, "Movie genre must be an array of enum Genre");

        input["genre"] = json!([]);
        let err = validate_full(&input).unwrap_err();
        assert_eq!(err.issues[0].code, IssueCode::TooSmall);
    }

    #[test]
    fn test_genre_is_case_sensitive() {
        let mut input = valid();
        input["genre"] = json!(["drama"]);
        assert!(validate_full(&input).is_err());
    }

    #[test]
    fn test_non_object_body() {
        let err = validate_full(&json!([1, 2])).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(err.issues[0].path.is_empty());
        assert_eq!(err.issues[0].message, "Expected object, received array");
    }

    #[test]
    fn test_partial_empty_body() {
        let patch = validate_partial(&json!({})).unwrap();
        assert_eq!(patch, MoviePatch::default());
    }

    #[test]
    fn test_partial_does_not_default_rate() {
        let patch = validate_partial(&json!({"title": "New"})).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New"));
        assert_eq!(patch.rate, None);
    }

    #[test]
    fn test_partial_checks_present_fields() {
        let err = validate_partial(&json!({"year": 3000, "genre": ["Western"]})).unwrap_err();
        assert_eq!(fields_of(&err), vec!["year", "genre.0"]);
    }

    #[test]
    fn test_error_serializes_as_array() {
        let err = validate_partial(&json!({"rate": -1})).unwrap_err();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            json!([{
                "code": "too_small",
                "path": ["rate"],
                "message": "Number must be greater than or equal to 0"
            }])
        );
    }

    #[test]
    fn test_error_display() {
        let err = validate_partial(&json!({"rate": 11})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid movie: rate: Number must be less than or equal to 10"
        );
    }
}
