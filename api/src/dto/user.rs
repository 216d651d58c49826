use serde::{Deserialize, Serialize};
use sf_core::domain::entities::User;
use validator::Validate;

/// Body of user create and update
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100))]
    pub last_name: String,

    #[validate(email, length(max = 255))]
    pub email: String,

    #[validate(length(max = 20))]
    pub phone_number: Option<String>,
}

impl UserRequest {
    pub fn into_user(self) -> User {
        let mut user = User::new(self.first_name, self.last_name, self.email);
        user.phone_number = self.phone_number;
        user
    }

    /// Overwrites the editable fields of `user`; the password hash is kept
    pub fn apply_to(self, user: &mut User) {
        user.first_name = self.first_name;
        user.last_name = self.last_name;
        user.email = self.email;
        user.phone_number = self.phone_number;
        user.touch();
    }
}
