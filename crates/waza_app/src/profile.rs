//! Session-to-profile resolution.

use crate::session::SessionContext;
use crate::{AppError, AppResult};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use waza_client::{ClientError, TrainerProfile, UserType, WarriorProfile, WazaApiClient};

/// Outcome of resolving a session into a domain profile.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Warrior(WarriorProfile),
    Trainer(TrainerProfile),
    /// No profile exists for this user yet (first login). `redirect`
    /// carries the completion route the first time a given session
    /// resolves incomplete and is `None` on repeat resolutions, so callers
    /// issue at most one redirect per unresolved session.
    Incomplete { redirect: Option<String> },
}

/// Resolves the current session into exactly one profile variant, keyed by
/// the session's declared user type.
pub struct ProfileResolver {
    client: Arc<dyn WazaApiClient>,
    redirected: Mutex<HashSet<String>>,
}

impl ProfileResolver {
    pub fn new(client: Arc<dyn WazaApiClient>) -> Self {
        Self {
            client,
            redirected: Mutex::new(HashSet::new()),
        }
    }

    pub async fn resolve(&self, session: &SessionContext) -> AppResult<Resolution> {
        if session.is_new_user {
            return Ok(self.incomplete(session).await);
        }

        match session.user_type {
            UserType::WazaWarrior => {
                match self.client.get_warrior_profile(&session.user_id).await {
                    Ok(profile) => {
                        self.mark_resolved(session).await;
                        Ok(Resolution::Warrior(profile))
                    }
                    Err(ClientError::NotFound(_)) => Ok(self.incomplete(session).await),
                    Err(e) => Err(AppError::Api(e)),
                }
            }
            UserType::WazaTrainer => {
                match self.client.get_trainer_profile(&session.user_id).await {
                    Ok(profile) => {
                        self.mark_resolved(session).await;
                        Ok(Resolution::Trainer(profile))
                    }
                    Err(ClientError::NotFound(_)) => Ok(self.incomplete(session).await),
                    Err(e) => Err(AppError::Api(e)),
                }
            }
        }
    }

    /// Record the unresolved session and hand out the completion route only
    /// on its first incomplete resolution.
    async fn incomplete(&self, session: &SessionContext) -> Resolution {
        let mut redirected = self.redirected.lock().await;
        if redirected.insert(session.session_id.clone()) {
            Resolution::Incomplete {
                redirect: Some(completion_route(session)),
            }
        } else {
            Resolution::Incomplete { redirect: None }
        }
    }

    async fn mark_resolved(&self, session: &SessionContext) {
        self.redirected.lock().await.remove(&session.session_id);
    }
}

fn completion_route(session: &SessionContext) -> String {
    let page_route = match session.user_type {
        UserType::WazaWarrior => "wazaWarrior",
        UserType::WazaTrainer => "wazaTrainer",
    };
    format!("/completeProfile/{}/{}", page_route, session.user_id)
}
