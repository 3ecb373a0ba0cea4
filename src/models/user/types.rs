use serde::Deserialize;

/// Internal user struct for authentication; includes the password hash.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: String,
    pub is_superuser: bool,
}

/// New user data for creation. `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub email: String,
    pub is_superuser: bool,
}

/// Form data from the admin "create user" form.
/// Checkboxes are only submitted when ticked.
#[derive(Debug, Deserialize)]
pub struct UserForm {
    pub username: String,
    pub password: String,
    pub email: String,
    #[serde(default)]
    pub is_superuser: Option<String>,
    pub csrf_token: String,
}

impl UserForm {
    pub fn wants_superuser(&self) -> bool {
        self.is_superuser.is_some()
    }
}
