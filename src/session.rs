// src/session.rs

//! Session controller: the intent-level operations a client drives
//! (`complete_quiz`, `authenticate`, `logout`, `bootstrap`) and the closed
//! set of views it can be routed to.

use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    classifier::classify,
    error::AppError,
    models::{
        personality::{AnswerSet, Stream},
        quiz::SubmitQuizResponse,
        user::{
            Credentials, LoginRequest, Profile, RegisterRequest, Role, default_name,
            normalize_email,
        },
    },
    state::AppState,
    store::{WriteMode, get_as, server_timestamp},
    sync::{FanOutReport, ResultSynchronizer, SyncError},
    utils::{
        hash::{hash_password, verify_password},
        html::clean_display_name,
        jwt::{Claims, sign_jwt},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Login,
    Signup,
}

/// Where a client should be routed next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum View {
    Landing,
    Auth {
        mode: AuthMode,
        role: Role,
        /// A classification is waiting for an account to be saved into.
        #[serde(rename = "pendingResult")]
        pending_result: bool,
    },
    TestIntro,
    Test,
    Dashboard {
        stream: Option<Stream>,
    },
    ParentDashboard {
        linked: bool,
    },
}

impl View {
    /// Routing for a signed-in account with a readable profile.
    pub fn route_for(profile: &Profile) -> View {
        match profile.role {
            Role::Student if profile.test_taken => View::Dashboard {
                stream: profile.stream,
            },
            Role::Student => View::TestIntro,
            Role::Parent => View::ParentDashboard {
                linked: profile.linked_student_uid.is_some(),
            },
        }
    }

    /// Safe default when the profile cannot be read.
    pub fn fallback(role: Role) -> View {
        match role {
            Role::Student => View::TestIntro,
            Role::Parent => View::ParentDashboard { linked: false },
        }
    }
}

pub enum AuthIntent {
    Signup(RegisterRequest),
    Login(LoginRequest),
}

/// Response body for register/login.
#[derive(Debug, Serialize)]
pub struct AuthOutcome {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub uid: String,
    pub role: Role,
    pub profile: Option<Profile>,
    pub view: View,
    /// Present when pending quiz answers were saved during this call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_saved: Option<FanOutReport>,
}

/// Response body for the bootstrap call.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub uid: String,
    pub role: Role,
    pub profile: Option<Profile>,
    pub view: View,
}

fn reject_empty_pending(pending: &Option<AnswerSet>) -> Result<(), AppError> {
    match pending {
        Some(answers) if answers.is_empty() => {
            Err(AppError::BadRequest("No answers submitted".to_string()))
        }
        _ => Ok(()),
    }
}

fn display_name(requested: Option<&str>, email: &str) -> String {
    requested
        .and_then(clean_display_name)
        .or_else(|| clean_display_name(&default_name(email)))
        .unwrap_or_else(|| "Student".to_string())
}

pub struct Session<'a> {
    state: &'a AppState,
}

impl<'a> Session<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn sync(&self) -> ResultSynchronizer<'a> {
        ResultSynchronizer::new(self.state.store.as_ref(), &self.state.paths)
    }

    /// Classifies a submitted quiz. Anonymous callers get the result back
    /// unsaved and are routed to signup; signed-in students get it fanned out.
    pub async fn complete_quiz(
        &self,
        identity: Option<&Claims>,
        answers: AnswerSet,
    ) -> Result<SubmitQuizResponse, AppError> {
        if answers.is_empty() {
            return Err(AppError::BadRequest("No answers submitted".to_string()));
        }

        let result = classify(&answers);

        let Some(claims) = identity else {
            return Ok(SubmitQuizResponse {
                result,
                saved: false,
                view: View::Auth {
                    mode: AuthMode::Signup,
                    role: Role::Student,
                    pending_result: true,
                },
            });
        };

        if claims.role != Role::Student {
            return Err(AppError::Forbidden(
                "Only students can take the assessment".to_string(),
            ));
        }

        let sync = self.sync();
        let name = sync
            .load_profile(&claims.sub)
            .await?
            .map(|p| p.name)
            .unwrap_or_else(|| "Student".to_string());

        let report = sync.save_classification(&claims.sub, &name, &result).await;
        if let Some(msg) = report.failure() {
            return Err(AppError::InternalServerError(format!(
                "Failed to save results: {}",
                msg
            )));
        }

        Ok(SubmitQuizResponse {
            view: View::Dashboard {
                stream: Some(result.recommended_stream),
            },
            result,
            saved: true,
        })
    }

    pub async fn authenticate(&self, intent: AuthIntent) -> Result<AuthOutcome, AppError> {
        let (uid, role, student_email, pending) = match intent {
            AuthIntent::Signup(req) => self.sign_up(req).await?,
            AuthIntent::Login(req) => self.log_in(req).await?,
        };

        let sync = self.sync();

        if let (Role::Parent, Some(email)) = (role, student_email.as_deref()) {
            // A failed link at sign-in is not fatal; the parent can link later.
            match sync.link_student(&uid, email).await {
                Ok(link) => tracing::info!("Linked at sign-in: {}", link.linked_student_uid),
                Err(SyncError::StudentNotFound) => {
                    tracing::warn!("Parent {} gave unknown student email", uid)
                }
                Err(e) => tracing::error!("Link failed for {}: {:?}", uid, e),
            }
        }

        let mut pending_saved = None;
        match (role, pending) {
            (Role::Student, Some(answers)) => {
                let result = classify(&answers);
                let name = match sync.load_profile(&uid).await {
                    Ok(Some(p)) => p.name,
                    _ => "Student".to_string(),
                };
                pending_saved = Some(sync.save_classification(&uid, &name, &result).await);
            }
            (Role::Parent, Some(_)) => {
                tracing::warn!("Ignoring pending answers sent by parent {}", uid);
            }
            _ => {}
        }

        let token = sign_jwt(
            &uid,
            role,
            &self.state.config.jwt_secret,
            self.state.config.jwt_expiration,
        )?;

        let (profile, view) = match sync.load_profile(&uid).await {
            Ok(Some(profile)) => {
                let view = View::route_for(&profile);
                (Some(profile), view)
            }
            Ok(None) => (None, View::fallback(role)),
            Err(e) => {
                tracing::error!("Failed to read profile for {}: {:?}", uid, e);
                (None, View::fallback(role))
            }
        };

        Ok(AuthOutcome {
            token,
            token_type: "Bearer",
            uid,
            role,
            profile,
            view,
            pending_saved,
        })
    }

    /// Creates credentials, profile and (for students) the email lookup entry.
    async fn sign_up(
        &self,
        req: RegisterRequest,
    ) -> Result<(String, Role, Option<String>, Option<AnswerSet>), AppError> {
        req.validate()?;
        reject_empty_pending(&req.pending_answers)?;

        let store = self.state.store.as_ref();
        let paths = &self.state.paths;
        let email = normalize_email(&req.email);
        let credentials_path = paths.credentials(&email);

        if store.get(&credentials_path).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let uid = Uuid::new_v4().to_string();
        let name = display_name(req.name.as_deref(), &email);

        let profile = Profile {
            uid: uid.clone(),
            email: email.clone(),
            name: name.clone(),
            role: req.role,
            stream: None,
            test_taken: false,
            linked_student_uid: None,
            linked_student_email: None,
            created_at: None,
            last_login: None,
        };
        let mut doc = serde_json::to_value(&profile)?;
        if let Value::Object(fields) = &mut doc {
            fields.insert("createdAt".to_string(), server_timestamp());
            fields.insert("lastLogin".to_string(), server_timestamp());
        }
        store
            .put(&paths.profile(&uid), doc, WriteMode::Replace)
            .await?;

        if req.role == Role::Student {
            self.sync().register_lookup(&uid, &email, &name).await?;
        }

        // Credentials last: a failure above leaves nothing that blocks a retry.
        let credentials = Credentials {
            uid: uid.clone(),
            email: email.clone(),
            password_hash: hash_password(&req.password)?,
            role: req.role,
        };
        store
            .put(
                &credentials_path,
                serde_json::to_value(&credentials)?,
                WriteMode::Replace,
            )
            .await?;

        tracing::info!("Registered {} account {}", req.role, uid);
        Ok((uid, req.role, req.student_email, req.pending_answers))
    }

    /// Verifies credentials and refreshes the profile's login fields.
    async fn log_in(
        &self,
        req: LoginRequest,
    ) -> Result<(String, Role, Option<String>, Option<AnswerSet>), AppError> {
        req.validate()?;
        reject_empty_pending(&req.pending_answers)?;

        let store = self.state.store.as_ref();
        let paths = &self.state.paths;
        let email = normalize_email(&req.email);

        let credentials: Credentials = get_as(store, &paths.credentials(&email))
            .await?
            .ok_or(AppError::AuthError("User not found".to_string()))?;

        if !verify_password(&req.password, &credentials.password_hash)? {
            return Err(AppError::AuthError("Invalid password".to_string()));
        }

        let mut patch = json!({
            "uid": credentials.uid,
            "email": email,
            "role": credentials.role,
            "lastLogin": server_timestamp(),
        });
        let profile_path = paths.profile(&credentials.uid);
        let has_name = store
            .get(&profile_path)
            .await?
            .as_ref()
            .and_then(|doc| doc.get("name"))
            .and_then(Value::as_str)
            .is_some_and(|name| !name.trim().is_empty());

        // A requested name always wins; a profile without one gets the default.
        let name = match req.name.as_deref().and_then(clean_display_name) {
            Some(name) => Some(name),
            None if !has_name => Some(display_name(None, &email)),
            None => None,
        };
        if let (Some(name), Value::Object(fields)) = (name, &mut patch) {
            fields.insert("name".to_string(), Value::String(name));
        }
        store.put(&profile_path, patch, WriteMode::Merge).await?;

        Ok((
            credentials.uid,
            credentials.role,
            req.student_email,
            req.pending_answers,
        ))
    }

    /// Routes a returning token holder. Store failures fall back to the
    /// safe default for the token's role instead of erroring.
    pub async fn bootstrap(&self, claims: &Claims) -> SessionInfo {
        let (profile, view) = match self.sync().load_profile(&claims.sub).await {
            Ok(Some(profile)) => {
                let view = View::route_for(&profile);
                (Some(profile), view)
            }
            Ok(None) => (None, View::Landing),
            Err(e) => {
                tracing::error!("Bootstrap failed for {}: {:?}", claims.sub, e);
                (None, View::fallback(claims.role))
            }
        };

        SessionInfo {
            uid: claims.sub.clone(),
            role: claims.role,
            profile,
            view,
        }
    }

    /// Tokens are stateless; the client simply drops it.
    pub fn logout() -> View {
        View::Landing
    }
}
