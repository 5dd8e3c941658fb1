//! unleash_user lookup by id, email or both

use declarative::{
    Attribute, AttributeType, DataSource, Diagnostic, Diagnostics, OpResult, Schema, find_by_key,
};
use serde::{Deserialize, Serialize};
use unleash_client::client::admin;
use unleash_client::types::{User, UserSearch};
use unleash_client::{ApiRequest, Client};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserQuery {
    fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub root_role: Option<i64>,
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.into_option(),
            email: user.email.into_option(),
            name: user.name.into_option(),
            root_role: user.root_role.into_option(),
        }
    }
}

pub struct UserLookup {
    client: Client,
}

impl UserLookup {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn get(&self, id: i64) -> OpResult<User> {
        Ok(self
            .client
            .expect_json(ApiRequest::get(admin(format!("/user-admin/{id}"))), &[200])?)
    }

    fn by_id(&self, raw: &str, email: Option<&str>) -> OpResult<User> {
        let id: i64 = raw.parse().map_err(|e: std::num::ParseIntError| {
            Diagnostic::error(format!("User id was not a number {raw}"), e.to_string())
        })?;
        let user = self.get(id)?;

        if let Some(email) = email {
            let actual = user.email.as_option().map(String::as_str);
            if !actual.is_some_and(|actual| actual.eq_ignore_ascii_case(email)) {
                return Err(Diagnostic::error(
                    "User id and email mismatch",
                    format!(
                        "User {raw} has email {:?}, which does not match the requested email {email:?}.",
                        actual.unwrap_or_default()
                    ),
                )
                .into());
            }
        }
        Ok(user)
    }

    // The search is fuzzy and returns summaries.
    fn by_email(&self, email: &str) -> OpResult<User> {
        let search: UserSearch = self.client.expect_json(
            ApiRequest::get(admin("/user-admin/search")).query("q", email),
            &[200],
        )?;
        let candidate = find_by_key(search.users, email, |user| {
            user.email
                .as_option()
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(email))
        });
        match candidate {
            Some(summary) => self.get(summary.id),
            None => Err(Diagnostic::error(
                "User not found",
                format!("No user matched the email {email:?}."),
            )
            .into()),
        }
    }
}

impl DataSource for UserLookup {
    type Query = UserQuery;
    type Model = UserRecord;

    fn type_name(&self) -> &'static str {
        "unleash_user"
    }

    fn schema(&self) -> Schema {
        Schema::new("Fetch a user by id or email.")
            .with_attribute(Attribute::optional_computed(
                "id",
                AttributeType::String,
                "Identifier for this user.",
            ))
            .with_attribute(Attribute::optional_computed(
                "email",
                AttributeType::String,
                "The email of the user.",
            ))
            .with_attribute(Attribute::computed(
                "username",
                AttributeType::String,
                "The username of the user.",
            ))
            .with_attribute(Attribute::computed("name", AttributeType::String, "The name of the user."))
            .with_attribute(Attribute::computed(
                "root_role",
                AttributeType::Int,
                "The role id for the user.",
            ))
    }

    fn validate(&self, query: &UserQuery) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if query.id().is_none() && query.email().is_none() {
            diags.add_error("Missing lookup key", "Either id or email must be set");
        }
        diags
    }

    fn read(&self, query: &UserQuery) -> OpResult<UserRecord> {
        let user = match (query.id(), query.email()) {
            (Some(id), email) => self.by_id(id, email)?,
            (None, Some(email)) => self.by_email(email)?,
            (None, None) => return Err(self.validate(query)),
        };
        Ok(user.into())
    }
}
