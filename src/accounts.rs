//! Users: registration, profile updates, credentials and account deletion.
//!
//! Validation always runs before any write and reports every broken rule. Email uniqueness is
//! checked here first for a friendly error, and again by the datastore's unique index, which catches
//! two registrations racing for the same address.
use crate::credentials::{self, DigestKind};
use crate::datastore::{
    constraint_violation,
    structs::{NewUser, User, UserChanges},
    Client, ConstraintViolation,
};
use crate::metrics::observe;
use crate::twoface::{reject, Cause, Fallible, TfError};
use crate::validation::{
    check_email_format, check_max_len, check_min_len, check_present, normalize_email,
    ValidationErrors, EMAIL_MAX_LEN, NAME_MAX_LEN, PASSWORD_MIN_LEN,
};
use chrono::{offset::Utc, DateTime};
use tracing::{debug, info, warn};

/// What a user typed into a signup or profile form.
#[derive(Debug, Clone, Default)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    /// On profile updates, `None` keeps the current password.
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

impl UserForm {
    pub fn new(name: &str, email: &str, password: &str) -> Self {
        Self {
            name: name.to_owned(),
            email: email.to_owned(),
            password: Some(password.to_owned()),
            password_confirmation: Some(password.to_owned()),
        }
    }

    /// Check every rule that doesn't need the datastore.
    pub fn validate_fields(&self, password_required: bool) -> ValidationErrors {
        let mut errors = ValidationErrors::default();

        check_present(&mut errors, "name", &self.name);
        check_max_len(&mut errors, "name", &self.name, NAME_MAX_LEN);

        check_present(&mut errors, "email", &self.email);
        check_max_len(&mut errors, "email", &self.email, EMAIL_MAX_LEN);
        check_email_format(&mut errors, "email", &self.email);

        match &self.password {
            Some(password) => {
                // Six spaces are long enough but still blank.
                check_present(&mut errors, "password", password);
                check_min_len(&mut errors, "password", password, PASSWORD_MIN_LEN);
                if let Some(confirmation) = &self.password_confirmation {
                    if confirmation != password {
                        errors.add("password_confirmation", "doesn't match password");
                    }
                }
            }
            None if password_required => errors.add("password", "can't be blank"),
            None => {}
        }
        errors
    }
}

/// A freshly created user and the activation token that would be emailed to them.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    pub activation_token: String,
}

/// Every broken rule for this form, including a taken email. `existing` is the user being edited,
/// whose own email doesn't count as taken.
pub async fn validate<DS: Client>(
    ds: &DS,
    form: &UserForm,
    existing: Option<&User>,
) -> Fallible<ValidationErrors> {
    let mut errors = form.validate_fields(existing.is_none());
    if !errors.has("email") {
        if let Some(holder) = ds.find_user_by_email(&normalize_email(&form.email)).await? {
            if existing.map(|u| u.id) != Some(holder.id) {
                errors.add("email", "has already been taken");
            }
        }
    }
    Ok(errors)
}

/// Could this form be registered right now?
pub async fn is_valid<DS: Client>(ds: &DS, form: &UserForm) -> Fallible<bool> {
    Ok(validate(ds, form, None).await?.is_empty())
}

/// Create an unactivated user.
pub async fn register<DS: Client>(ds: &DS, form: UserForm) -> Fallible<Registration> {
    observe("register", || async {
        validate(ds, &form, None).await?.into_result()?;
        let password = form.password.as_deref().unwrap_or_default();
        let activation_token = credentials::new_token();
        let new_user = NewUser {
            name: form.name.trim().to_owned(),
            email: normalize_email(&form.email),
            password_digest: Some(credentials::hash_password(password)?),
            activation_digest: Some(credentials::token_digest(&activation_token)),
            admin: false,
            activated: false,
            activated_at: None,
        };
        let user = ds.insert_user(new_user).await.map_err(email_taken)?;
        info!(user_id = %user.id, "registered user");
        Ok(Registration {
            user,
            activation_token,
        })
    })
    .await
}

/// Change name, email and optionally password.
pub async fn update_profile<DS: Client>(ds: &DS, user: &User, form: UserForm) -> Fallible<User> {
    observe("update_profile", || async {
        validate(ds, &form, Some(user)).await?.into_result()?;
        let password_digest = match &form.password {
            Some(password) => Some(Some(credentials::hash_password(password)?)),
            None => None,
        };
        let changes = UserChanges {
            name: Some(form.name.trim().to_owned()),
            email: Some(normalize_email(&form.email)),
            password_digest,
            ..Default::default()
        };
        let updated = ds
            .update_user(user.id, changes)
            .await
            .map_err(email_taken)?;
        guard!(let Some(updated) = updated else {
            return Err(reject(Cause::NotFound, "user not found"))
        });
        info!(user_id = %user.id, "updated profile");
        Ok(updated)
    })
    .await
}

/// The datastore's unique index fired: the email was taken between validation and the write.
fn email_taken(err: TfError) -> TfError {
    let duplicate = matches!(
        constraint_violation(&err),
        Some(ConstraintViolation::DuplicateEmail(_))
    );
    if !duplicate {
        return err;
    }
    let mut errors = ValidationErrors::default();
    errors.add("email", "has already been taken");
    errors.into_error()
}

impl User {
    /// Does this token match the stored digest of the given kind? Always false when no digest of
    /// that kind has been stored.
    pub fn authenticated(&self, kind: DigestKind, token: &str) -> bool {
        credentials::token_matches(self.digest(kind), token)
    }

    /// Does this password match the stored password digest?
    pub fn authenticate_password(&self, password: &str) -> bool {
        guard!(let Some(digest) = &self.password_digest else {
            return false
        });
        credentials::verify_password(password, digest)
    }
}

/// Look up a user by email and check their password.
pub async fn authenticate<DS: Client>(
    ds: &DS,
    email: &str,
    password: &str,
) -> Fallible<Option<User>> {
    observe("authenticate", || async {
        let user = ds.find_user_by_email(&normalize_email(email)).await?;
        Ok(user.filter(|u| u.authenticate_password(password)))
    })
    .await
}

/// Store a new remember digest and return the token, e.g. for a persistent cookie.
pub async fn remember<DS: Client>(ds: &DS, user: &User) -> Fallible<String> {
    observe("remember", || async {
        let token = credentials::new_token();
        let digest = credentials::token_digest(&token);
        let changes = UserChanges::digest(DigestKind::Remember, Some(digest));
        ds.update_user(user.id, changes).await?;
        Ok(token)
    })
    .await
}

/// Drop the remember digest so no remember token authenticates any more.
pub async fn forget<DS: Client>(ds: &DS, user: &User) -> Fallible<()> {
    observe("forget", || async {
        ds.update_user(user.id, UserChanges::digest(DigestKind::Remember, None))
            .await?;
        Ok(())
    })
    .await
}

/// The user as currently stored. Token checks run against this rather than the caller's copy,
/// which may predate an activation or a reset.
async fn stored<DS: Client>(ds: &DS, user: &User) -> Fallible<User> {
    guard!(let Some(current) = ds.find_user(user.id).await? else {
        return Err(reject(Cause::NotFound, "user not found"))
    });
    Ok(current)
}

/// Activate the account if the token is right and it isn't active yet.
pub async fn activate<DS: Client>(ds: &DS, user: &User, token: &str) -> Fallible<User> {
    observe("activate", || async {
        let user = stored(ds, user).await?;
        if user.activated || !user.authenticated(DigestKind::Activation, token) {
            warn!(user_id = %user.id, "rejected activation");
            return Err(reject(Cause::UserBadAuth, "invalid activation link"));
        }
        let changes = UserChanges {
            activated: Some(true),
            activated_at: Some(Some(Utc::now())),
            ..Default::default()
        };
        let activated = ds.update_user(user.id, changes).await?;
        guard!(let Some(activated) = activated else {
            return Err(reject(Cause::NotFound, "user not found"))
        });
        info!(user_id = %user.id, "activated user");
        Ok(activated)
    })
    .await
}

/// Store a reset digest, stamp when it was sent, and return the token for the reset link.
pub async fn create_reset_digest<DS: Client>(ds: &DS, user: &User) -> Fallible<String> {
    observe("create_reset_digest", || async {
        let token = credentials::new_token();
        let digest = credentials::token_digest(&token);
        let changes = UserChanges::digest(DigestKind::Reset, Some(digest));
        ds.update_user(user.id, changes).await?;
        debug!(user_id = %user.id, "issued password reset");
        Ok(token)
    })
    .await
}

/// Set a new password using a reset token that is correct and under two hours old. The reset
/// digest is cleared afterwards so the link only works once.
pub async fn reset_password<DS: Client>(
    ds: &DS,
    user: &User,
    token: &str,
    password: &str,
    password_confirmation: &str,
    now: DateTime<Utc>,
) -> Fallible<User> {
    observe("reset_password", || async {
        let user = stored(ds, user).await?;
        if !user.authenticated(DigestKind::Reset, token) {
            return Err(reject(Cause::UserBadAuth, "invalid password reset link"));
        }
        if user.password_reset_expired(now) {
            return Err(reject(Cause::UserBadAuth, "password reset has expired"));
        }
        let form = UserForm {
            name: user.name.clone(),
            email: user.email.clone(),
            password: Some(password.to_owned()),
            password_confirmation: Some(password_confirmation.to_owned()),
        };
        form.validate_fields(true).into_result()?;
        let mut changes = UserChanges::digest(DigestKind::Reset, None);
        changes.password_digest = Some(Some(credentials::hash_password(password)?));
        let updated = ds.update_user(user.id, changes).await?;
        guard!(let Some(updated) = updated else {
            return Err(reject(Cause::NotFound, "user not found"))
        });
        info!(user_id = %user.id, "reset password");
        Ok(updated)
    })
    .await
}

/// Delete the user along with their microposts and every follow edge in either direction.
pub async fn destroy<DS: Client>(ds: &DS, user: &User) -> Fallible<Option<User>> {
    observe("destroy_user", || async {
        let deleted = ds.delete_user(user.id).await?;
        if deleted.is_some() {
            info!(user_id = %user.id, "destroyed user");
        } else {
            debug!(user_id = %user.id, "user was already gone");
        }
        Ok(deleted)
    })
    .await
}
