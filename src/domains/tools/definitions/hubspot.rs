//! HubSpot CRM toolkit.

use std::sync::Arc;

use serde_json::{Value, json};

use super::{bind, endpoint};
use crate::domains::tools::descriptor::{AuthRequirement, ToolDescriptor};
use crate::domains::tools::error::{ExternalCallError, ToolError};
use crate::domains::tools::outbound::{HttpClient, HttpRequest};
use crate::domains::tools::registry::ToolRegistry;
use crate::domains::tools::request::InvocationRequest;

pub struct HubspotToolkit {
    client: Arc<dyn HttpClient>,
    base_url: String,
}

impl HubspotToolkit {
    pub const PROVIDER: &'static str = "hubspot";

    pub fn new(client: Arc<dyn HttpClient>, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn auth() -> AuthRequirement {
        AuthRequirement::oauth2(Self::PROVIDER)
    }

    pub fn register(self, registry: &mut ToolRegistry) -> Result<(), ToolError> {
        let kit = Arc::new(self);

        registry.register(
            ToolDescriptor::new("create_company", "For creating hubspot company", Self::auth())
                .params(["name", "domain", "industry"])
                .required(["name", "domain", "industry"]),
            bind(&kit, Self::create_company),
        )?;
        registry.register(
            ToolDescriptor::new("create_contact", "For creating hubspot contact", Self::auth())
                .params(["first_name", "last_name", "email", "phone"])
                .required(["first_name", "last_name", "email", "phone"]),
            bind(&kit, Self::create_contact),
        )?;

        Ok(())
    }

    /// POST `{"properties": ...}` to a CRM object collection.
    fn create_object(
        &self,
        req: &InvocationRequest,
        object: &str,
        properties: Value,
    ) -> Result<Value, ExternalCallError> {
        let url = endpoint(&self.base_url, &format!("crm/v3/objects/{}", object));
        let request = HttpRequest::post(url)
            .bearer(req.auth_token())
            .json(json!({ "properties": properties }));
        self.client.send(request)?.json()
    }

    pub fn create_company(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        self.create_object(
            req,
            "companies",
            json!({
                "name": req.value("name"),
                "domain": req.value("domain"),
                "industry": req.value("industry"),
            }),
        )
    }

    /// HubSpot property names differ from the tool parameters
    /// (`first_name` -> `firstname`).
    pub fn create_contact(&self, req: &InvocationRequest) -> Result<Value, ExternalCallError> {
        self.create_object(
            req,
            "contacts",
            json!({
                "firstname": req.value("first_name"),
                "lastname": req.value("last_name"),
                "email": req.value("email"),
                "phone": req.value("phone"),
            }),
        )
    }
}
