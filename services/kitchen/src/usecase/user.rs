use larder_domain::user::UserRole;

use crate::domain::repository::UserRepository;
use crate::domain::types::{NewUser, User};
use crate::domain::validation::{ValidationErrors, check_required, is_email};
use crate::error::KitchenServiceError;

// ── CreateUser ───────────────────────────────────────────────────────────────

pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub role: u8,
}

pub struct CreateUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> CreateUserUseCase<R> {
    pub async fn execute(
        &self,
        caller_role: u8,
        input: CreateUserInput,
    ) -> Result<User, KitchenServiceError> {
        let allowed = UserRole::from_u8(caller_role).is_some_and(UserRole::can_provision_users);
        if !allowed {
            return Err(KitchenServiceError::Forbidden);
        }

        let mut errors = ValidationErrors::new();
        check_required(&mut errors, "name", &input.name, 255);
        let email = input.email.trim().to_lowercase();
        if !is_email(&email) {
            errors.add("email", "email must be a valid email address");
        }
        if UserRole::from_u8(input.role).is_none() {
            errors.add("role", "role is invalid");
        }
        errors.into_result()?;

        self.repo
            .create(&NewUser {
                name: input.name.trim().to_owned(),
                email,
                role: input.role,
            })
            .await
    }
}

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> GetUserUseCase<R> {
    pub async fn execute(&self, user_id: i64) -> Result<User, KitchenServiceError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(KitchenServiceError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    struct MockUserRepo {
        user: Option<User>,
        created: Mutex<Vec<NewUser>>,
    }

    impl MockUserRepo {
        fn new(user: Option<User>) -> Self {
            Self {
                user,
                created: Mutex::new(vec![]),
            }
        }
    }

    impl UserRepository for MockUserRepo {
        async fn find_by_id(&self, _id: i64) -> Result<Option<User>, KitchenServiceError> {
            Ok(self.user.clone())
        }
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, KitchenServiceError> {
            Ok(self.user.clone())
        }
        async fn create(&self, user: &NewUser) -> Result<User, KitchenServiceError> {
            self.created.lock().unwrap().push(user.clone());
            Ok(User {
                id: 1,
                name: user.name.clone(),
                email: user.email.clone(),
                role: user.role,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        }
    }

    fn input(email: &str) -> CreateUserInput {
        CreateUserInput {
            name: " Sam ".into(),
            email: email.into(),
            role: 0,
        }
    }

    #[tokio::test]
    async fn should_reject_callers_below_service_role() {
        let usecase = CreateUserUseCase {
            repo: MockUserRepo::new(None),
        };
        let result = usecase.execute(1, input("sam@example.com")).await;
        assert!(matches!(result, Err(KitchenServiceError::Forbidden)));
        assert!(usecase.repo.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_lowercase_email_and_trim_name() {
        let usecase = CreateUserUseCase {
            repo: MockUserRepo::new(None),
        };
        let user = usecase
            .execute(2, input("Sam@Example.COM"))
            .await
            .unwrap();
        assert_eq!(user.email, "sam@example.com");
        assert_eq!(user.name, "Sam");
    }

    #[tokio::test]
    async fn should_report_invalid_email_as_validation_error() {
        let usecase = CreateUserUseCase {
            repo: MockUserRepo::new(None),
        };
        let result = usecase.execute(2, input("not-an-email")).await;
        let Err(KitchenServiceError::Validation(errors)) = result else {
            panic!("expected validation error");
        };
        assert!(errors.get("email").is_some());
    }

    #[tokio::test]
    async fn should_return_user_not_found() {
        let usecase = GetUserUseCase {
            repo: MockUserRepo::new(None),
        };
        let result = usecase.execute(9).await;
        assert!(matches!(result, Err(KitchenServiceError::UserNotFound)));
    }
}
