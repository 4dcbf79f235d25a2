//! Domain operations. Each service is constructed with its collaborators
//! and authorizes its own mutations through [`crate::authz`].

pub mod access_requests;
pub mod accounts;
pub mod members;
pub mod notes;
pub mod workspaces;

use std::sync::Arc;

use crate::{
    auth::{password::CredentialHasher, tokens::TokenService},
    mailer::Mailer,
    secrets::SecretGenerator,
    store::Store,
};

pub use access_requests::AccessRequestService;
pub use accounts::AccountService;
pub use members::MemberService;
pub use notes::NoteService;
pub use workspaces::WorkspaceService;

#[derive(Clone)]
pub struct Services {
    pub store: Store,
    pub tokens: Arc<TokenService>,
    pub accounts: AccountService,
    pub workspaces: WorkspaceService,
    pub members: MemberService,
    pub access_requests: AccessRequestService,
    pub notes: NoteService,
}

impl Services {
    pub fn new(
        store: Store,
        tokens: Arc<TokenService>,
        hasher: Arc<dyn CredentialHasher>,
        secrets: Arc<dyn SecretGenerator>,
        mailer: Arc<dyn Mailer>,
        reset_link_base_url: impl Into<String>,
    ) -> Self {
        Self {
            accounts: AccountService::new(
                store.clone(),
                Arc::clone(&tokens),
                hasher,
                mailer,
                reset_link_base_url,
            ),
            workspaces: WorkspaceService::new(store.clone(), secrets),
            members: MemberService::new(store.clone()),
            access_requests: AccessRequestService::new(store.clone()),
            notes: NoteService::new(store.clone()),
            store,
            tokens,
        }
    }
}
