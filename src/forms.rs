//! Input schemas for the three forms the app accepts.
//!
//! Every form deserializes leniently (all fields optional) and is then
//! checked by `validate`, which either yields the cleaned values or the
//! per-field messages to show next to the inputs.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

/// What a page needs to redisplay a form: submitted values and messages.
#[derive(Debug, Default, Serialize)]
pub struct FormView {
    pub values: BTreeMap<&'static str, String>,
    pub errors: FieldErrors,
}

impl FormView {
    pub fn with_error(mut self, field: &'static str, message: impl Into<String>) -> Self {
        self.errors.entry(field).or_default().push(message.into());
        self
    }
}

const USERNAME: RangeInclusive<usize> = 1..=20;
const PASSWORD: RangeInclusive<usize> = 6..=30;
const EMAIL: RangeInclusive<usize> = 6..=50;
const NAME: RangeInclusive<usize> = 1..=30;
const TITLE: RangeInclusive<usize> = 1..=100;
const CONTENT: RangeInclusive<usize> = 1..=255;

#[derive(Default)]
struct Checker {
    errors: FieldErrors,
}

impl Checker {
    fn field(
        &mut self,
        name: &'static str,
        value: &Option<String>,
        required: &str,
        bounds: RangeInclusive<usize>,
    ) -> String {
        let value = value.as_deref().unwrap_or_default();
        if value.is_empty() {
            self.fail(name, required);
        } else if !bounds.contains(&value.chars().count()) {
            self.fail(
                name,
                format!("Length between {}-{} characters.", bounds.start(), bounds.end()),
            );
        }
        value.to_owned()
    }

    fn fail(&mut self, name: &'static str, message: impl Into<String>) {
        self.errors.entry(name).or_default().push(message.into());
    }

    fn finish<T>(self, valid: T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(valid)
        } else {
            Err(self.errors)
        }
    }
}

fn values<const N: usize>(pairs: [(&'static str, &Option<String>); N]) -> BTreeMap<&'static str, String> {
    pairs
        .into_iter()
        .map(|(name, value)| (name, value.clone().unwrap_or_default()))
        .collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration, FieldErrors> {
        let mut checker = Checker::default();
        let username = checker.field("username", &self.username, "Enter Username.", USERNAME);
        // Usernames end up in redirect paths.
        if !username.is_empty()
            && !username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            checker.fail("username", "Use letters, digits, '.', '_' or '-' only.");
        }

        let registration = Registration {
            username,
            password: checker.field("password", &self.password, "Enter password.", PASSWORD),
            email: checker.field("email", &self.email, "Enter email.", EMAIL),
            first_name: checker.field("first_name", &self.first_name, "Enter first name.", NAME),
            last_name: checker.field("last_name", &self.last_name, "Enter last name.", NAME),
        };
        checker.finish(registration)
    }

    pub fn view(&self, errors: FieldErrors) -> FormView {
        FormView {
            values: values([
                ("username", &self.username),
                ("email", &self.email),
                ("first_name", &self.first_name),
                ("last_name", &self.last_name),
            ]),
            errors,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        let mut checker = Checker::default();
        let credentials = Credentials {
            username: checker.field("username", &self.username, "Enter Username.", USERNAME),
            password: checker.field("password", &self.password, "Enter password.", PASSWORD),
        };
        checker.finish(credentials)
    }

    pub fn view(&self, errors: FieldErrors) -> FormView {
        FormView {
            values: values([("username", &self.username)]),
            errors,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackForm {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug)]
pub struct FeedbackInput {
    pub title: String,
    pub content: String,
}

impl FeedbackForm {
    pub fn prefilled(title: &str, content: &str) -> Self {
        Self {
            title: Some(title.to_owned()),
            content: Some(content.to_owned()),
        }
    }

    pub fn validate(&self) -> Result<FeedbackInput, FieldErrors> {
        let mut checker = Checker::default();
        let input = FeedbackInput {
            title: checker.field("title", &self.title, "Enter a title.", TITLE),
            content: checker.field("content", &self.content, "Enter content.", CONTENT),
        };
        checker.finish(input)
    }

    pub fn view(&self, errors: FieldErrors) -> FormView {
        FormView {
            values: values([("title", &self.title), ("content", &self.content)]),
            errors,
        }
    }
}
