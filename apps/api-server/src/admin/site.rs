//! Admin registry.
//!
//! Models are registered explicitly; [`autoregister`] then fills in a
//! generic admin for every declared model that is still missing.

use std::collections::BTreeMap;

use blog_core::domain::{MODELS, ModelMeta, Post};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminError {
    #[error("The model {0} is already registered")]
    AlreadyRegistered(&'static str),
}

/// Admin options for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAdmin {
    pub model: ModelMeta,
    /// Columns of the changelist, in display order.
    pub list_display: Vec<&'static str>,
}

impl ModelAdmin {
    /// Generic admin showing every concrete field in declaration order.
    pub fn new(model: ModelMeta) -> Self {
        Self {
            model,
            list_display: model.concrete_fields().collect(),
        }
    }

    pub fn with_list_display(mut self, columns: &[&'static str]) -> Self {
        self.list_display = columns.to_vec();
        self
    }

    pub fn name(&self) -> &'static str {
        self.model.name
    }
}

/// Registered admins keyed (and therefore ordered) by model name.
#[derive(Debug, Clone, Default)]
pub struct AdminSite {
    pub site_name: String,
    registry: BTreeMap<&'static str, ModelAdmin>,
}

impl AdminSite {
    pub fn new(site_name: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            registry: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, admin: ModelAdmin) -> Result<(), AdminError> {
        let name = admin.name();
        if self.registry.contains_key(name) {
            return Err(AdminError::AlreadyRegistered(name));
        }
        self.registry.insert(name, admin);
        Ok(())
    }

    pub fn get(&self, model: &str) -> Option<&ModelAdmin> {
        self.registry.get(model)
    }

    /// Registered admins sorted by model name.
    pub fn models(&self) -> impl Iterator<Item = &ModelAdmin> {
        self.registry.values()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }
}

/// Register a generic admin for each model not registered yet.
///
/// Returns the names registered by this call; existing registrations are
/// left untouched.
pub fn autoregister(site: &mut AdminSite, models: &[ModelMeta]) -> Vec<&'static str> {
    let mut registered = Vec::new();
    for model in models {
        match site.register(ModelAdmin::new(*model)) {
            Ok(()) => registered.push(model.name),
            Err(AdminError::AlreadyRegistered(name)) => {
                tracing::debug!(model = name, "Skipping model with an explicit admin");
            }
        }
    }
    registered
}

/// The admin site served at start-up.
pub fn build_admin_site(site_name: &str) -> AdminSite {
    let mut site = AdminSite::new(format!("{site_name} administration"));

    // Posts get a narrower changelist than the generic one.
    let post_admin = ModelAdmin::new(Post::META).with_list_display(&["id", "title", "created_at"]);
    if let Err(e) = site.register(post_admin) {
        tracing::warn!("{}", e);
    }

    let registered = autoregister(&mut site, MODELS);
    tracing::info!(models = ?registered, total = site.len(), "Admin models registered");
    site
}
