use uuid::Uuid;

/// Read-only view of the local user the gateway acts for.
pub trait Datastore: Send + Sync {
    fn user_id(&self) -> String;
    fn locale(&self) -> String;
}

/// Process-local store: a random user id per process, locale from settings.
#[derive(Debug, Clone)]
pub struct InMemoryDatastore {
    user_id: String,
    locale: String,
}

impl InMemoryDatastore {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            locale: locale.into(),
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }
}

impl Datastore for InMemoryDatastore {
    fn user_id(&self) -> String {
        self.user_id.clone()
    }

    fn locale(&self) -> String {
        self.locale.clone()
    }
}
